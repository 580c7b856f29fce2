//! Per-key selection bag

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Remaining indices of the current cycle plus the last emitted value
#[derive(Debug, Default)]
pub(crate) struct KeyState {
    /// Shuffled indices still to be emitted this cycle
    bag: VecDeque<usize>,
    /// Length of the candidate list the bag was built for
    len: usize,
    /// Text of the most recently emitted value
    pub(crate) last: Option<String>,
}

impl KeyState {
    pub(crate) fn needs_refill(&self, len: usize) -> bool {
        self.bag.is_empty() || self.len != len
    }

    /// Start a new cycle: every index exactly once, uniformly shuffled
    pub(crate) fn refill<R: Rng + ?Sized>(&mut self, len: usize, rng: &mut R) {
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);
        self.bag = indices.into();
        self.len = len;
    }

    pub(crate) fn pop(&mut self) -> Option<usize> {
        self.bag.pop_front()
    }

    pub(crate) fn push_front(&mut self, idx: usize) {
        self.bag.push_front(idx);
    }

    #[cfg(test)]
    pub(crate) fn remaining(&self) -> usize {
        self.bag.len()
    }
}

//! Non-repeating random selection
//!
//! [`NonRepeatingSelector`] cycles through a candidate list in random
//! order, one shuffled "bag" per key, so every candidate is emitted once
//! before any repeats. On top of that it avoids handing out the same value
//! twice in a row when the next index in the bag allows it.
//!
//! ```
//! use vg_selector::NonRepeatingSelector;
//!
//! let selector = NonRepeatingSelector::new();
//! let greetings = ["Hallo", "Hey", "Servus"];
//! let first = selector.select(Some("greet:kueche"), &greetings).unwrap();
//! let second = selector.select(Some("greet:kueche"), &greetings).unwrap();
//! assert_ne!(first, second);
//! ```

mod bag;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Mutex;
use tracing::trace;

use bag::KeyState;

/// Key used when the caller does not supply one
pub const DEFAULT_KEY: &str = "default";

/// Random selection with per-key bags and last-pick memos
pub struct NonRepeatingSelector {
    /// Bag and last pick per selector key
    keys: DashMap<String, KeyState>,
    rng: Mutex<StdRng>,
}

impl NonRepeatingSelector {
    /// Create a selector seeded from system entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a selector with a fixed seed (reproducible sequences)
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            keys: DashMap::new(),
            rng: Mutex::new(rng),
        }
    }

    /// Pick the next candidate for `key`
    ///
    /// Returns `None` for an empty list. Values are compared by their
    /// `Display` text when avoiding an immediate repeat.
    pub fn select<T>(&self, key: Option<&str>, candidates: &[T]) -> Option<T>
    where
        T: Clone + fmt::Display,
    {
        self.select_by(key, candidates, |c| c.to_string())
    }

    /// Pick from a JSON value; anything but a non-empty array yields `None`
    pub fn select_value(
        &self,
        key: Option<&str>,
        candidates: &serde_json::Value,
    ) -> Option<serde_json::Value> {
        let items = candidates.as_array()?;
        self.select_by(key, items, value_text)
    }

    fn select_by<T: Clone>(
        &self,
        key: Option<&str>,
        candidates: &[T],
        as_text: impl Fn(&T) -> String,
    ) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        let key = match key {
            Some(k) if !k.is_empty() => k,
            _ => DEFAULT_KEY,
        };

        let mut entry = self.keys.entry(key.to_string()).or_default();
        let state = entry.value_mut();

        if state.needs_refill(candidates.len()) {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            state.refill(candidates.len(), &mut *rng);
            trace!(key, len = candidates.len(), "Reshuffled selection bag");
        }

        let mut idx = state.pop()?;
        if candidates.len() > 1 {
            let repeats_last = state
                .last
                .as_deref()
                .is_some_and(|last| as_text(&candidates[idx]) == last);
            if repeats_last {
                if let Some(next) = state.pop() {
                    state.push_front(idx);
                    idx = next;
                }
            }
        }

        let chosen = candidates[idx].clone();
        state.last = Some(as_text(&chosen));
        Some(chosen)
    }

    /// Uniform pick with no memory
    pub fn pick<T: Clone>(&self, candidates: &[T]) -> Option<T> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        candidates.choose(&mut *rng).cloned()
    }

    /// True with probability `p` (clamped to 0..=1)
    pub fn chance(&self, p: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Drop all bags and last-pick memos
    pub fn reset(&self) {
        self.keys.clear();
    }

    /// Number of keys with selection state
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl Default for NonRepeatingSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Text identity of a JSON candidate: strings compare by content, the rest
/// by their JSON rendering.
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    const ROOMS: [&str; 5] = ["a", "b", "c", "d", "e"];

    #[test]
    fn test_each_cycle_is_a_permutation() {
        let selector = NonRepeatingSelector::seeded(7);

        for cycle in 0..50 {
            let picks: Vec<&str> = (0..ROOMS.len())
                .map(|_| selector.select(Some("k"), &ROOMS).unwrap())
                .collect();
            let unique: HashSet<&str> = picks.iter().copied().collect();
            assert_eq!(unique.len(), ROOMS.len(), "cycle {cycle}: {picks:?}");
        }
    }

    #[test]
    fn test_no_immediate_repeat_across_cycles() {
        for seed in 0..20 {
            let selector = NonRepeatingSelector::seeded(seed);
            let mut last = None;
            for _ in 0..200 {
                let pick = selector.select(Some("k"), &["x", "y"]).unwrap();
                assert_ne!(Some(pick), last);
                last = Some(pick);
            }
        }
    }

    #[test]
    fn test_no_immediate_repeat_with_longer_lists() {
        for seed in 0..50 {
            let selector = NonRepeatingSelector::seeded(seed);
            let mut last = selector.select(Some("k"), &ROOMS).unwrap();
            // 100 full cycles, so every bag boundary is crossed
            for i in 1..ROOMS.len() * 100 {
                let pick = selector.select(Some("k"), &ROOMS).unwrap();
                assert_ne!(pick, last, "seed {seed}, pick {i}");
                last = pick;
            }
        }
    }

    #[test]
    fn test_single_candidate_repeats() {
        let selector = NonRepeatingSelector::new();
        assert_eq!(selector.select(Some("k"), &["only"]), Some("only"));
        assert_eq!(selector.select(Some("k"), &["only"]), Some("only"));
    }

    #[test]
    fn test_empty_and_non_list_inputs() {
        let selector = NonRepeatingSelector::new();
        let empty: [&str; 0] = [];
        assert_eq!(selector.select(Some("k"), &empty), None);
        assert_eq!(selector.select_value(Some("k"), &json!([])), None);
        assert_eq!(selector.select_value(Some("k"), &json!("abc")), None);
        assert_eq!(selector.select_value(Some("k"), &json!({"a": 1})), None);
        assert_eq!(selector.select_value(Some("k"), &serde_json::Value::Null), None);
    }

    #[test]
    fn test_select_value_from_array() {
        let selector = NonRepeatingSelector::seeded(3);
        let candidates = json!(["eins", 2, "drei"]);
        let picks: HashSet<String> = (0..3)
            .map(|_| value_text(&selector.select_value(None, &candidates).unwrap()))
            .collect();
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn test_keys_are_independent() {
        let selector = NonRepeatingSelector::seeded(11);
        let first_a: Vec<&str> = (0..5).map(|_| selector.select(Some("a"), &ROOMS).unwrap()).collect();
        // Key "b" starts its own cycle regardless of "a"
        let first_b: HashSet<&str> = (0..5).map(|_| selector.select(Some("b"), &ROOMS).unwrap()).collect();
        assert_eq!(first_b.len(), 5);
        assert_eq!(first_a.iter().collect::<HashSet<_>>().len(), 5);
        assert_eq!(selector.key_count(), 2);
    }

    #[test]
    fn test_missing_key_uses_default() {
        let selector = NonRepeatingSelector::seeded(5);
        selector.select(None, &ROOMS);
        selector.select(Some(""), &ROOMS);
        selector.select(Some(DEFAULT_KEY), &ROOMS);
        assert_eq!(selector.key_count(), 1);
    }

    #[test]
    fn test_list_length_change_restarts_cycle() {
        let selector = NonRepeatingSelector::seeded(9);
        selector.select(Some("k"), &ROOMS);
        let shorter = ["x", "y"];
        for _ in 0..10 {
            let pick = selector.select(Some("k"), &shorter).unwrap();
            assert!(shorter.contains(&pick));
        }
    }

    #[test]
    fn test_reset_and_chance() {
        let selector = NonRepeatingSelector::seeded(1);
        selector.select(Some("k"), &ROOMS);
        selector.reset();
        assert_eq!(selector.key_count(), 0);

        assert!(selector.chance(1.0));
        assert!(!selector.chance(0.0));
        assert!(selector.chance(2.0));
        assert!(ROOMS.contains(&selector.pick(&ROOMS).unwrap()));
        assert_eq!(selector.pick::<&str>(&[]), None);
    }
}

//! Last remote output per room, station and day part

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::request::GreetingDecision;

/// Output recorded for one memo key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoEntry {
    pub greeting: String,
    pub decision: String,
    pub recorded_at: DateTime<Utc>,
}

impl MemoEntry {
    /// True when both texts match `output` exactly
    pub fn repeats(&self, output: &GreetingDecision) -> bool {
        self.greeting == output.greeting && self.decision == output.decision
    }
}

/// Keyed by `room|station|daypart`
#[derive(Debug, Default)]
pub struct VoiceMemo {
    entries: DashMap<String, MemoEntry>,
}

impl VoiceMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<MemoEntry> {
        self.entries.get(key).map(|e| e.value().clone())
    }

    pub fn record(&self, key: &str, output: &GreetingDecision) {
        self.entries.insert(
            key.to_string(),
            MemoEntry {
                greeting: output.greeting.clone(),
                decision: output.decision.clone(),
                recorded_at: Utc::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&self) {
        self.entries.clear();
    }
}

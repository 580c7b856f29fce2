//! Host state type: a value plus its acknowledgement flag

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Context;

/// The value of a host state at a point in time
///
/// `ack = false` marks a command (written by a script, not yet confirmed
/// by the adapter); `ack = true` marks a confirmed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostState {
    /// The stored value (string, number, bool or null)
    pub val: serde_json::Value,

    /// Whether the owning adapter acknowledged the value
    pub ack: bool,

    /// When the state was last written
    pub ts: DateTime<Utc>,

    /// When the value last changed
    pub lc: DateTime<Utc>,

    /// Context of the write that produced this state
    pub context: Context,
}

impl HostState {
    /// Create a new state with current timestamp
    pub fn new(val: impl Into<serde_json::Value>, ack: bool, context: Context) -> Self {
        let now = Utc::now();
        Self {
            val: val.into(),
            ack,
            ts: now,
            lc: now,
            context,
        }
    }

    /// Create the successor state, preserving `lc` when the value is unchanged
    pub fn with_update(
        &self,
        val: impl Into<serde_json::Value>,
        ack: bool,
        context: Context,
    ) -> Self {
        let now = Utc::now();
        let val = val.into();
        let changed = self.val != val;

        Self {
            val,
            ack,
            ts: now,
            lc: if changed { now } else { self.lc },
            context,
        }
    }

    /// Whether the state carries a usable value
    pub fn has_value(&self) -> bool {
        !self.val.is_null()
    }

    /// Whether value and ack already match the given pair
    pub fn matches(&self, val: &serde_json::Value, ack: bool) -> bool {
        self.val == *val && self.ack == ack
    }

    /// Render the value as text the way scripts see it
    pub fn val_string(&self) -> String {
        match &self.val {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

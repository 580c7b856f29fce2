//! Soft-failing helpers scripts use on top of a [`StateStore`]

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace, warn};
use vg_core::StateId;

use crate::StateStore;

/// Pause between the clearing write and the real write of a command
pub const DEFAULT_COMMAND_DELAY: Duration = Duration::from_millis(150);

/// Helpers that never fail: invalid ids, missing states and write errors
/// degrade to defaults or no-ops.
#[async_trait]
pub trait StateStoreExt: StateStore {
    /// Read a value, falling back to `default` for unknown ids or null values
    async fn get_value_or(&self, id: &str, default: Value) -> Value;

    /// Read a value rendered as text, falling back to `default`
    async fn get_string_or(&self, id: &str, default: &str) -> String;

    /// Write unless value and ack are already current
    ///
    /// Returns whether a write was issued and accepted.
    async fn safe_set(&self, id: &str, val: Value, ack: bool) -> bool;

    /// Clear a command state, wait `delay`, then write `val`, both unacknowledged
    ///
    /// Repeating the same command therefore always produces a change.
    async fn write_command(&self, id: &str, val: &str, delay: Duration);

    /// Whether `id` is a valid id with an existing state object
    async fn has_state(&self, id: &str) -> bool;
}

fn parse_id(id: &str) -> Option<StateId> {
    match id.parse::<StateId>() {
        Ok(id) => Some(id),
        Err(e) => {
            trace!(id, error = %e, "Ignoring invalid state id");
            None
        }
    }
}

#[async_trait]
impl<S: StateStore + ?Sized> StateStoreExt for S {
    async fn get_value_or(&self, id: &str, default: Value) -> Value {
        let Some(id) = parse_id(id) else {
            return default;
        };

        match self.get(&id).await {
            Some(state) if state.has_value() => state.val,
            _ => default,
        }
    }

    async fn get_string_or(&self, id: &str, default: &str) -> String {
        let Some(id) = parse_id(id) else {
            return default.to_string();
        };

        match self.get(&id).await {
            Some(state) if state.has_value() => state.val_string(),
            _ => default.to_string(),
        }
    }

    async fn safe_set(&self, id: &str, val: Value, ack: bool) -> bool {
        let Some(id) = parse_id(id) else {
            return false;
        };

        if let Some(current) = self.get(&id).await {
            if current.matches(&val, ack) {
                trace!(id = %id, "Value already current, skipping write");
                return false;
            }
        }

        match self.set(&id, val, ack).await {
            Ok(_) => true,
            Err(e) => {
                warn!(id = %id, error = %e, "State write failed");
                false
            }
        }
    }

    async fn write_command(&self, id: &str, val: &str, delay: Duration) {
        let Some(id) = parse_id(id) else {
            return;
        };

        debug!(id = %id, "Writing command");

        if let Err(e) = self.set(&id, Value::String(String::new()), false).await {
            warn!(id = %id, error = %e, "Clearing command state failed");
        }
        tokio::time::sleep(delay).await;
        if let Err(e) = self.set(&id, Value::String(val.to_string()), false).await {
            warn!(id = %id, error = %e, "Command write failed");
        }
    }

    async fn has_state(&self, id: &str) -> bool {
        match parse_id(id) {
            Some(id) => self.exists(&id).await,
            None => false,
        }
    }
}

//! Host state read/write wrappers
//!
//! This crate provides the [`StateStore`] collaborator interface the voice
//! helpers read credentials from and write commands to, an in-memory
//! implementation backed by the event bus, and the soft-failing helpers
//! scripts use on top of it (`get_value_or`, `safe_set`, `write_command`).

mod ext;
mod memory;

pub use ext::{StateStoreExt, DEFAULT_COMMAND_DELAY};
pub use memory::MemoryStateStore;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use vg_core::{HostState, StateId};

/// Result type for state store writes
pub type StateStoreResult<T> = Result<T, StateStoreError>;

/// Errors a host state store can report on writes
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateStoreError {
    /// The host engine is not reachable right now
    #[error("state store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Access to host automation states
///
/// Reads return `None` for unknown ids; transient read failures are
/// reported the same way so callers fall back to defaults.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the current state of an id
    async fn get(&self, id: &StateId) -> Option<HostState>;

    /// Write a value with the given acknowledgement flag
    async fn set(
        &self,
        id: &StateId,
        val: serde_json::Value,
        ack: bool,
    ) -> StateStoreResult<HostState>;

    /// Check whether a state object exists
    async fn exists(&self, id: &StateId) -> bool;
}

/// Shared handle to a state store implementation
pub type SharedStateStore = Arc<dyn StateStore>;

//! In-memory state store firing change events on the bus

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};
use vg_core::events::StateChangedData;
use vg_core::{Context, HostState, StateId};
use vg_event_bus::EventBus;

use crate::{StateStore, StateStoreError, StateStoreResult};

/// The in-memory state store tracks all host states
///
/// Every successful write fires a STATE_CHANGED event, even when the value
/// is unchanged; write suppression is the caller's job (see `safe_set`).
pub struct MemoryStateStore {
    /// All states keyed by state id
    states: DashMap<StateId, HostState>,
    /// Event bus for firing state change events
    event_bus: Arc<EventBus>,
    /// Simulated host outage: reads miss and writes fail
    offline: AtomicBool,
}

impl MemoryStateStore {
    /// Create a new store with the given event bus
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            states: DashMap::new(),
            event_bus,
            offline: AtomicBool::new(false),
        }
    }

    /// Mark the host as unreachable (or reachable again)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of writes stored so far, by distinct id
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Write with an explicit context
    #[instrument(skip(self, val, context), fields(id = %id))]
    pub fn set_with_context(
        &self,
        id: &StateId,
        val: serde_json::Value,
        ack: bool,
        context: Context,
    ) -> StateStoreResult<HostState> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StateStoreError::Unavailable {
                reason: "host offline".to_string(),
            });
        }

        let old_state = self.states.get(id).map(|s| s.clone());
        let new_state = match &old_state {
            Some(existing) => existing.with_update(val, ack, context.clone()),
            None => HostState::new(val, ack, context.clone()),
        };

        debug!(
            ack,
            changed = old_state.as_ref().map(|s| s.val != new_state.val).unwrap_or(true),
            "Setting host state"
        );

        self.states.insert(id.clone(), new_state.clone());

        self.event_bus.publish_typed(
            StateChangedData {
                id: id.clone(),
                old_state,
                new_state: new_state.clone(),
            },
            context,
        );

        Ok(new_state)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, id: &StateId) -> Option<HostState> {
        if self.offline.load(Ordering::SeqCst) {
            return None;
        }
        self.states.get(id).map(|s| s.clone())
    }

    async fn set(
        &self,
        id: &StateId,
        val: serde_json::Value,
        ack: bool,
    ) -> StateStoreResult<HostState> {
        self.set_with_context(id, val, ack, Context::new())
    }

    async fn exists(&self, id: &StateId) -> bool {
        !self.offline.load(Ordering::SeqCst) && self.states.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn make_test_setup() -> (Arc<EventBus>, MemoryStateStore) {
        let event_bus = Arc::new(EventBus::new());
        let store = MemoryStateStore::new(event_bus.clone());
        (event_bus, store)
    }

    fn id(s: &str) -> StateId {
        StateId::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_set_and_get_state() {
        let (_, store) = make_test_setup();

        let state = assert_ok!(
            store
                .set(&id("javascript.0.voice.room"), json!("kueche"), true)
                .await
        );
        assert_eq!(state.val, json!("kueche"));
        assert!(state.ack);

        let retrieved = store.get(&id("javascript.0.voice.room")).await.unwrap();
        assert_eq!(retrieved.val_string(), "kueche");
        assert!(store.exists(&id("javascript.0.voice.room")).await);
        assert!(!store.exists(&id("javascript.0.voice.other")).await);
    }

    #[tokio::test]
    async fn test_state_changed_event_fired() {
        let (bus, store) = make_test_setup();
        let mut rx = bus.subscribe_typed::<StateChangedData>();

        store
            .set(&id("alexa2.0.Echo.Commands.speak"), json!("hallo"), false)
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.data.id.as_str(), "alexa2.0.Echo.Commands.speak");
        assert!(event.data.old_state.is_none());
        assert_eq!(event.data.new_state.val, json!("hallo"));
    }

    #[tokio::test]
    async fn test_offline_store() {
        let (_, store) = make_test_setup();
        store
            .set(&id("javascript.0.a"), json!(1), true)
            .await
            .unwrap();

        store.set_offline(true);
        assert!(store.get(&id("javascript.0.a")).await.is_none());
        assert!(!store.exists(&id("javascript.0.a")).await);
        let err = assert_err!(store.set(&id("javascript.0.a"), json!(2), true).await);
        assert!(matches!(err, StateStoreError::Unavailable { .. }));

        store.set_offline(false);
        assert_eq!(store.get(&id("javascript.0.a")).await.unwrap().val, json!(1));
    }
}

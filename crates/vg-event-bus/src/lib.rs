//! Broadcast bus for host state events
//!
//! The state store publishes one event per write; scripts waiting for a
//! command state to change subscribe by event type. Each type gets its own
//! `tokio::sync::broadcast` channel, created on first subscription.
//! Events published before anyone subscribed are dropped.

use dashmap::DashMap;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, trace};
use vg_core::{Context, Event, EventData, EventType};

const DEFAULT_CAPACITY: usize = 256;

pub struct EventBus {
    channels: DashMap<EventType, broadcast::Sender<Event>>,
    capacity: usize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Events a slow subscriber may lag behind before it misses some
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, event_type: impl Into<EventType>) -> broadcast::Receiver<Event> {
        let event_type = event_type.into();
        trace!(%event_type, "New subscriber");
        self.channels
            .entry(event_type)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub fn subscribe_typed<T: EventData>(&self) -> TypedReceiver<T> {
        TypedReceiver {
            rx: self.subscribe(T::EVENT_TYPE),
            _data: PhantomData,
        }
    }

    /// Deliver to current subscribers; returns how many received it
    pub fn publish(&self, event: Event) -> usize {
        let event_type = event.event_type.clone();
        let delivered = self
            .channels
            .get(&event_type)
            .and_then(|tx| tx.send(event).ok())
            .unwrap_or(0);
        debug!(%event_type, delivered, "Published event");
        delivered
    }

    pub fn publish_typed<T: EventData>(&self, data: T, context: Context) -> usize {
        self.publish(Event::typed(data, context).into_json())
    }

    /// Event types that have had a subscriber
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedEventBus = Arc<EventBus>;

/// Receiver that decodes payloads, skipping ones of the wrong shape
pub struct TypedReceiver<T> {
    rx: broadcast::Receiver<Event>,
    _data: PhantomData<T>,
}

impl<T: EventData> TypedReceiver<T> {
    pub async fn recv(&mut self) -> Result<Event<T>, RecvError> {
        loop {
            if let Some(event) = self.rx.recv().await?.decode() {
                return Ok(event);
            }
        }
    }

    pub fn try_recv(&mut self) -> Result<Event<T>, TryRecvError> {
        loop {
            if let Some(event) = self.rx.try_recv()?.decode() {
                return Ok(event);
            }
        }
    }
}

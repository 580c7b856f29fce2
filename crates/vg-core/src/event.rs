//! Events fired when host states are written

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::Context;

/// Payload with a fixed event type name
pub trait EventData: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const EVENT_TYPE: &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fired event; `T` is the payload, untyped JSON on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event<T = Value> {
    pub event_type: EventType,
    pub data: T,
    pub fired_at: DateTime<Utc>,
    /// Context of the write that caused the event
    pub context: Context,
}

impl<T> Event<T> {
    pub fn new(event_type: impl Into<EventType>, data: T, context: Context) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            fired_at: Utc::now(),
            context,
        }
    }

    fn with_data<U>(self, data: U) -> Event<U> {
        Event {
            event_type: self.event_type,
            data,
            fired_at: self.fired_at,
            context: self.context,
        }
    }
}

impl<T: EventData> Event<T> {
    pub fn typed(data: T, context: Context) -> Self {
        Self::new(T::EVENT_TYPE, data, context)
    }

    /// Untyped form for the bus; payloads that fail to serialize become null
    pub fn into_json(self) -> Event<Value> {
        let data = serde_json::to_value(&self.data).unwrap_or(Value::Null);
        self.with_data(data)
    }
}

impl Event<Value> {
    /// Typed view of the payload, if the type name and shape match
    pub fn decode<T: EventData>(self) -> Option<Event<T>> {
        if self.event_type.as_str() != T::EVENT_TYPE {
            return None;
        }
        let data = serde_json::from_value(self.data.clone()).ok()?;
        Some(self.with_data(data))
    }
}

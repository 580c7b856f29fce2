//! Core types for the voice greeting helpers
//!
//! This crate provides the fundamental types shared by the other crates:
//! StateId, HostState, Event, Context, plus the day-part and text helpers
//! used when composing spoken output.

mod context;
mod day_part;
mod event;
mod state;
mod state_id;
mod text;

pub use context::Context;
pub use day_part::{hhmm, DayPart};
pub use event::{Event, EventData, EventType};
pub use state::HostState;
pub use state_id::{StateId, StateIdError};
pub use text::{clip, ELLIPSIS};

/// Standard event types fired by the state store
pub mod events {
    use super::*;

    /// Event type for state changes
    pub const STATE_CHANGED: &str = "state_changed";

    /// Data for STATE_CHANGED events
    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    pub struct StateChangedData {
        pub id: StateId,
        pub old_state: Option<HostState>,
        pub new_state: HostState,
    }

    impl EventData for StateChangedData {
        const EVENT_TYPE: &'static str = STATE_CHANGED;
    }
}

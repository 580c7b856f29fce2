//! Greeting/decision text generation for the voice assistant
//!
//! [`VoiceService`] asks a remote text-generation model for a short spoken
//! greeting plus a "decision" line (what is about to happen, e.g. which
//! station starts). Whenever the remote path cannot deliver, because there
//! is no credential, no usable model, a failed or malformed call, or a
//! verbatim repeat of the previous answer, it falls back to the
//! [`LocalGenerator`], which composes text from built-in candidate lists
//! through the non-repeating selector.
//!
//! The service never returns an error: every call yields a usable pair.

mod failure;
mod local;
mod memo;
mod prompt;
mod request;
mod service;

pub use failure::GenerationFailure;
pub use local::{
    LocalGenerator, DEFAULT_GREETINGS, DEFAULT_JOKES, DEFAULT_MAX_DECISION_CHARS,
    DEFAULT_MAX_GREETING_CHARS, JOKE_PROBABILITY,
};
pub use memo::{MemoEntry, VoiceMemo};
pub use prompt::{build_input, build_instructions, Prompt};
pub use request::{
    GreetingDecision, GreetingRequest, HumorLevel, Style, DEFAULT_ROOM, DEFAULT_STATION,
};
pub use service::{
    GenerationSource, VoiceService, DEFAULT_TIMEOUT, REMOTE_MAX_DECISION_CHARS,
    REMOTE_MAX_GREETING_CHARS,
};

//! Origin of a state write

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Attached to every write and to the event it fires
///
/// The clear-then-write command pattern issues two writes; listeners tell
/// them apart from other writers through `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// ULID
    pub id: String,

    /// Script or adapter name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            id: Ulid::new().to_string(),
            source: None,
        }
    }

    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new()
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

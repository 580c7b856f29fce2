//! State ID type for dotted host-state identifiers (e.g. `javascript.0.voice.apiKey`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters the host engine refuses in state ids
const FORBIDDEN_CHARS: &[char] = &['*', '?', '[', ']', '"', '\'', ','];

/// Error type for invalid state IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateIdError {
    #[error("state id cannot be empty")]
    Empty,

    #[error("state id cannot contain empty segments (leading, trailing or doubled '.')")]
    EmptySegment,

    #[error("state id contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// A host state identifier made of dot-separated segments
///
/// The first segment is the adapter namespace (e.g. `javascript`), followed
/// by the instance number and an arbitrary object path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateId(String);

impl StateId {
    /// Validate and wrap a state id
    pub fn new(id: impl Into<String>) -> Result<Self, StateIdError> {
        let id = id.into();

        if id.is_empty() {
            return Err(StateIdError::Empty);
        }
        if id.split('.').any(str::is_empty) {
            return Err(StateIdError::EmptySegment);
        }
        if let Some(c) = id
            .chars()
            .find(|c| c.is_control() || FORBIDDEN_CHARS.contains(c))
        {
            return Err(StateIdError::ForbiddenChar(c));
        }

        Ok(Self(id))
    }

    /// The adapter namespace (first segment)
    pub fn namespace(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    /// The full id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for StateId {
    type Err = StateIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StateId {
    type Error = StateIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<StateId> for String {
    fn from(id: StateId) -> String {
        id.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

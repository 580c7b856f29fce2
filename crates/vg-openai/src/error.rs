//! Error types for Responses API calls

use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur talking to the remote endpoint
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The request did not complete within its timeout
    #[error("HTTP timeout")]
    Timeout,

    /// Connection, TLS or transport failure
    #[error("network error: {message}")]
    Network { message: String },

    /// The endpoint answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The body was not JSON or lacked the expected shape
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl ClientError {
    /// Whether the failure happened before any answer arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Timeout | ClientError::Network { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::MalformedResponse {
                reason: err.to_string(),
            }
        } else {
            ClientError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse {
            reason: err.to_string(),
        }
    }
}

//! Reasons the remote path was abandoned

use thiserror::Error;
use vg_openai::ClientError;

/// Why a greeting came from the local generator instead of the model
///
/// These never reach callers of the service; they are logged and turned
/// into a local result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error("no credential configured")]
    CredentialMissing,

    #[error("no model available")]
    ModelUnresolvable,

    #[error("network failure: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("remote output repeats the previous one")]
    DuplicateOutput,
}

impl From<ClientError> for GenerationFailure {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Timeout | ClientError::Network { .. } | ClientError::HttpStatus { .. } => {
                GenerationFailure::Network(err.to_string())
            }
            ClientError::MalformedResponse { reason } => GenerationFailure::MalformedResponse(reason),
        }
    }
}

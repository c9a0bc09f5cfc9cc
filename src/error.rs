//! Error types for interaction handling
//!
//! Callback failures are `anyhow::Error` values owned by whoever registered the
//! callback. They never unwind through the handler; the handler logs them and
//! reports the ones that matter through `InteractionError`.

use thiserror::Error;

/// Errors surfaced by the interaction handler
#[derive(Error, Debug)]
pub enum InteractionError {
    /// One or more steps of the end sequence failed; `message` is the last failure
    #[error("interaction `{name}` ended with error: {message}")]
    EndFailed { name: String, message: String },

    /// The clear step failed
    #[error("clearing interaction `{name}` failed: {message}")]
    ClearFailed { name: String, message: String },

    /// An operation that needs an active interaction found none
    #[error("no interaction is active")]
    NotActive,

    /// Handler configuration could not be parsed
    #[error("invalid handler config: {0}")]
    Config(#[from] serde_json::Error),
}

impl InteractionError {
    /// The failure message carried by end/clear errors, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::EndFailed { message, .. } | Self::ClearFailed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type alias for handler operations
pub type InteractionResult<T> = Result<T, InteractionError>;

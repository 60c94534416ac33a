//! Translation client error types.

use std::time::Duration;
use thiserror::Error;

/// Result type for translation operations.
pub type TranslateResult<T> = std::result::Result<T, TranslateError>;

/// Errors raised while translating.
///
/// These are raw failures; deciding whether to retry happens in the worker.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The request itself is unusable (bad target set).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No provider endpoint has been configured.
    #[error("Translation endpoint not configured")]
    MissingEndpoint,

    /// The provider did not answer in time.
    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the operation.
    #[error("Translation cancelled")]
    Cancelled,

    /// The provider answered with a non-success status.
    #[error("Provider returned HTTP {status}")]
    Http {
        /// HTTP status code.
        status: u16,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a body we could not use.
    #[error("Invalid provider response: {0}")]
    Decode(String),
}

impl TranslateError {
    /// Get the HTTP status code if this is a response error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status } => Some(*status),
            _ => None,
        }
    }

    /// Timeout or cancellation while waiting on the provider.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled)
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else if err.is_timeout() {
            Self::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

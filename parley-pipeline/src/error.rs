//! Pipeline error types.

use parley_cache::CacheError;
use parley_config::ConfigError;
use parley_queue::QueueError;
use parley_translate::TranslateError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Queue operation failed
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Cache backend could not be set up
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Translation failed
    #[error("Translation error: {0}")]
    Translate(#[from] TranslateError),

    /// Settings were invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Message store failed
    #[error("Message store error: {0}")]
    Store(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notify(String),

    /// Membership lookup failed
    #[error("Membership error: {0}")]
    Membership(String),
}

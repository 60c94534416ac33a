//! Maps translation failures to a retry verdict and a user-facing message.

use parley_translate::TranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad family of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCategory {
    /// Deployment problem; retrying cannot help
    Configuration,
    /// Provider or network trouble; usually transient
    Api,
    /// The provider refused the content
    Content,
    Unknown,
}

/// Specific failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCode {
    InvalidTargets,
    MissingEndpoint,
    Timeout,
    RateLimited,
    BadRequest,
    ServerError,
    NetworkError,
    /// The job could not be put on the queue
    QueueUnavailable,
    Unknown,
}

impl FailureCode {
    /// Fixed message safe to show to end users.
    pub fn safe_message(self) -> &'static str {
        match self {
            Self::InvalidTargets => "Translation is not available for the requested languages.",
            Self::MissingEndpoint => "Translation is not configured on this server.",
            Self::Timeout => "The translation service took too long to respond.",
            Self::RateLimited => "The translation service is busy. Please try again shortly.",
            Self::BadRequest => "This message could not be translated.",
            Self::ServerError => "The translation service is temporarily unavailable.",
            Self::NetworkError => "The translation service could not be reached.",
            Self::QueueUnavailable => "Translation could not be scheduled. Please retry.",
            Self::Unknown => "Translation failed.",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Verdict for one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureClassification {
    pub category: FailureCategory,
    pub code: FailureCode,
    pub is_retryable: bool,
    pub safe_message: &'static str,
}

impl FailureClassification {
    fn new(category: FailureCategory, code: FailureCode, is_retryable: bool) -> Self {
        Self {
            category,
            code,
            is_retryable,
            safe_message: code.safe_message(),
        }
    }

    /// Verdict recorded when a job never reached the queue.
    pub fn queue_unavailable() -> Self {
        Self::new(FailureCategory::Api, FailureCode::QueueUnavailable, true)
    }
}

/// Classify a translation error. Pure; never looks at error text.
pub fn classify(error: &TranslateError) -> FailureClassification {
    use FailureCategory::*;

    match error {
        TranslateError::InvalidArgument(_) => {
            FailureClassification::new(Configuration, FailureCode::InvalidTargets, false)
        }
        TranslateError::MissingEndpoint => {
            FailureClassification::new(Configuration, FailureCode::MissingEndpoint, false)
        }
        TranslateError::Timeout(_) | TranslateError::Cancelled => {
            FailureClassification::new(Api, FailureCode::Timeout, true)
        }
        TranslateError::Http { status: 429 } => {
            FailureClassification::new(Api, FailureCode::RateLimited, true)
        }
        TranslateError::Http { status: 400 } => {
            FailureClassification::new(Content, FailureCode::BadRequest, false)
        }
        TranslateError::Http { status } if (500..600).contains(status) => {
            FailureClassification::new(Api, FailureCode::ServerError, true)
        }
        TranslateError::Transport(_) => {
            FailureClassification::new(Api, FailureCode::NetworkError, true)
        }
        TranslateError::Http { .. } | TranslateError::Decode(_) => {
            FailureClassification::new(Unknown, FailureCode::Unknown, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_queue_unavailable() {
        let c = FailureClassification::queue_unavailable();
        assert_eq!(c.category, FailureCategory::Api);
        assert_eq!(c.code, FailureCode::QueueUnavailable);
        assert_eq!(c.code.to_string(), "QueueUnavailable");
        assert!(c.is_retryable);
    }

    #[test]
    fn test_invalid_argument_is_configuration() {
        let c = classify(&TranslateError::InvalidArgument("auto target".into()));
        assert_eq!(c.category, FailureCategory::Configuration);
        assert_eq!(c.code, FailureCode::InvalidTargets);
        assert!(!c.is_retryable);
    }

    #[test]
    fn test_missing_endpoint() {
        let c = classify(&TranslateError::MissingEndpoint);
        assert_eq!(c.code, FailureCode::MissingEndpoint);
        assert!(!c.is_retryable);
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        let c = classify(&TranslateError::Http { status: 429 });
        assert_eq!(c.category, FailureCategory::Api);
        assert_eq!(c.code, FailureCode::RateLimited);
        assert!(c.is_retryable);
    }

    #[test]
    fn test_bad_request_is_content() {
        let c = classify(&TranslateError::Http { status: 400 });
        assert_eq!(c.category, FailureCategory::Content);
        assert_eq!(c.code, FailureCode::BadRequest);
        assert!(!c.is_retryable);
    }

    #[test]
    fn test_transport_without_status_is_network() {
        let c = classify(&TranslateError::Transport("connection reset".into()));
        assert_eq!(c.code, FailureCode::NetworkError);
        assert!(c.is_retryable);
    }

    #[test]
    fn test_timeouts_and_cancellation() {
        for err in [
            TranslateError::Timeout(Duration::from_secs(30)),
            TranslateError::Cancelled,
        ] {
            let c = classify(&err);
            assert_eq!(c.code, FailureCode::Timeout);
            assert!(c.is_retryable);
        }
    }

    #[test]
    fn test_unclassified_is_explicitly_not_retryable() {
        for err in [
            TranslateError::Http { status: 403 },
            TranslateError::Decode("garbage".into()),
        ] {
            let c = classify(&err);
            assert_eq!(c.category, FailureCategory::Unknown);
            assert_eq!(c.code, FailureCode::Unknown);
            assert!(!c.is_retryable);
        }
    }

    #[test]
    fn test_safe_message_hides_raw_error() {
        let c = classify(&TranslateError::Transport("10.0.0.7:443 refused".into()));
        assert!(!c.safe_message.contains("10.0.0.7"));
    }

    #[test]
    fn test_pascal_case_serialization() {
        assert_eq!(
            serde_json::to_string(&FailureCode::RateLimited).unwrap(),
            "\"RateLimited\""
        );
        assert_eq!(FailureCategory::Configuration.to_string(), "Configuration");
    }
}

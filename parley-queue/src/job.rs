//! Translation job definition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{QueueError, QueueResult};

/// Source language sentinel asking the provider to detect the language.
pub const AUTO_DETECT: &str = "auto";

/// Priority given to freshly created jobs.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Opaque job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a chat message owned by the external message store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim and lower-case a language code. Empty input becomes [`AUTO_DETECT`].
pub fn normalize_language(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        AUTO_DETECT.to_string()
    } else {
        code.to_lowercase()
    }
}

/// One message's translation work.
///
/// Values are immutable: retries and re-prioritization produce new values
/// through [`next_attempt`](Self::next_attempt) and
/// [`with_priority`](Self::with_priority).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTranslationJob {
    job_id: JobId,
    message_id: MessageId,
    room_name: String,
    content: String,
    source_language: String,
    target_languages: Vec<String>,
    deployment_name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    not_before: Option<DateTime<Utc>>,
}

impl MessageTranslationJob {
    /// Create a job with a fresh id, auto-detected source and default priority.
    pub fn new(
        message_id: impl Into<MessageId>,
        room_name: impl Into<String>,
        content: impl Into<String>,
        target_languages: impl IntoIterator<Item = impl AsRef<str>>,
        deployment_name: impl Into<String>,
    ) -> Self {
        let mut targets: Vec<String> = Vec::new();
        for language in target_languages {
            let language = normalize_language(language.as_ref());
            if !targets.contains(&language) {
                targets.push(language);
            }
        }

        Self {
            job_id: JobId::new(),
            message_id: message_id.into(),
            room_name: room_name.into(),
            content: content.into(),
            source_language: AUTO_DETECT.to_string(),
            target_languages: targets,
            deployment_name: deployment_name.into(),
            created_at: Utc::now(),
            priority: DEFAULT_PRIORITY,
            retry_count: 0,
            not_before: None,
        }
    }

    pub fn with_source_language(mut self, language: &str) -> Self {
        self.source_language = normalize_language(language);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<JobId>) -> Self {
        self.job_id = job_id.into();
        self
    }

    /// The value to requeue after a retryable failure.
    ///
    /// Keeps the job id so the retry lineage stays traceable. A non-zero
    /// `delay` makes the job ineligible for dequeue until it has elapsed.
    pub fn next_attempt(&self, delay: Duration) -> Self {
        let not_before = if delay.is_zero() {
            None
        } else {
            chrono::Duration::from_std(delay)
                .ok()
                .map(|delay| Utc::now() + delay)
        };

        Self {
            retry_count: self.retry_count.saturating_add(1),
            not_before,
            ..self.clone()
        }
    }

    /// The value to requeue for a user-triggered retry: fresh id, zeroed
    /// retry budget, elevated priority, immediately eligible.
    pub fn manual_retry(&self, priority: i32) -> Self {
        Self {
            job_id: JobId::new(),
            priority,
            retry_count: 0,
            not_before: None,
            ..self.clone()
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_languages(&self) -> &[String] {
        &self.target_languages
    }

    pub fn deployment_name(&self) -> &str {
        &self.deployment_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.not_before
    }

    /// Whether the job may be processed at `now`.
    pub fn is_ready_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before.is_none_or(|at| now >= at)
    }

    /// Encode as the queue wire format.
    pub fn to_payload(&self) -> QueueResult<String> {
        serde_json::to_string(self).map_err(|e| QueueError::Serialization(e.to_string()))
    }

    /// Decode from the queue wire format.
    pub fn from_payload(payload: &str) -> QueueResult<Self> {
        serde_json::from_str(payload).map_err(|e| QueueError::Deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> MessageTranslationJob {
        MessageTranslationJob::new("msg-1", "general", "Hello", ["en", "pl"], "gpt-4o-mini")
    }

    #[test]
    fn test_job_creation() {
        let job = job();
        assert_eq!(job.message_id().as_str(), "msg-1");
        assert_eq!(job.room_name(), "general");
        assert_eq!(job.source_language(), AUTO_DETECT);
        assert_eq!(job.target_languages(), ["en", "pl"]);
        assert_eq!(job.priority(), DEFAULT_PRIORITY);
        assert_eq!(job.retry_count(), 0);
        assert!(job.not_before().is_none());
    }

    #[test]
    fn test_targets_are_normalized_and_deduplicated() {
        let job = MessageTranslationJob::new("m", "r", "t", [" EN", "pl", "en", "PL "], "d");
        assert_eq!(job.target_languages(), ["en", "pl"]);
    }

    #[test]
    fn test_source_language_normalization() {
        assert_eq!(job().with_source_language(" DE ").source_language(), "de");
        assert_eq!(job().with_source_language("").source_language(), AUTO_DETECT);
    }

    #[test]
    fn test_job_id_uniqueness() {
        assert_ne!(job().job_id(), job().job_id());
    }

    #[test]
    fn test_next_attempt_returns_new_value() {
        let original = job();
        let retried = original.next_attempt(Duration::ZERO);

        assert_eq!(original.retry_count(), 0);
        assert_eq!(retried.retry_count(), 1);
        assert_eq!(retried.job_id(), original.job_id());
        assert!(retried.is_ready_at(Utc::now()));
    }

    #[test]
    fn test_next_attempt_with_delay_is_not_ready() {
        let retried = job().next_attempt(Duration::from_secs(60));
        let now = Utc::now();

        assert!(!retried.is_ready_at(now));
        assert!(retried.is_ready_at(now + chrono::Duration::seconds(61)));
    }

    #[test]
    fn test_manual_retry_resets_budget() {
        let failed = job().next_attempt(Duration::from_secs(30)).next_attempt(Duration::ZERO);
        let retried = failed.manual_retry(10);

        assert_eq!(retried.retry_count(), 0);
        assert_eq!(retried.priority(), 10);
        assert_ne!(retried.job_id(), failed.job_id());
        assert_eq!(retried.message_id(), failed.message_id());
        assert!(retried.not_before().is_none());
    }

    #[test]
    fn test_payload_round_trip_preserves_every_field() {
        let original = job()
            .with_source_language("en")
            .with_priority(10)
            .next_attempt(Duration::from_secs(5));

        let payload = original.to_payload().unwrap();
        let decoded = MessageTranslationJob::from_payload(&payload).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_wire_format_uses_camel_case() {
        let payload = job().to_payload().unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert!(value.get("jobId").is_some());
        assert!(value.get("targetLanguages").is_some());
        assert!(value.get("retryCount").is_some());
        assert!(value.get("notBefore").is_none());
    }

    #[test]
    fn test_malformed_payload() {
        let err = MessageTranslationJob::from_payload("{not json").unwrap_err();
        assert!(matches!(err, QueueError::Deserialization(_)));
    }
}

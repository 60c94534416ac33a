//! Chat message translation state and the message store seam.

use crate::classifier::{FailureCategory, FailureClassification, FailureCode};
use crate::error::PipelineResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parley_queue::{JobId, MessageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Translation state of a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranslationStatus {
    #[default]
    None,
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TranslationStatus {
    /// Whether `next` is a legal successor.
    ///
    /// Re-entering `Pending` or `InProgress` is allowed: delivery is
    /// at-least-once and a redelivered job repeats those writes.
    pub fn can_transition_to(self, next: TranslationStatus) -> bool {
        use TranslationStatus::*;

        matches!(
            (self, next),
            (None, Pending)
                | (Pending, Pending)
                | (Pending, InProgress)
                | (InProgress, InProgress)
                | (InProgress, Completed)
                | (InProgress, Failed)
                | (Failed, Pending)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The translation-relevant view of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub room_name: String,
    pub content: String,
    /// `None` means auto-detect
    #[serde(default)]
    pub source_language: Option<String>,
    /// Requested targets; empty means the configured defaults
    #[serde(default)]
    pub target_languages: Vec<String>,
    #[serde(default)]
    pub translation_status: TranslationStatus,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
    #[serde(default)]
    pub translation_job_id: Option<JobId>,
    #[serde(default)]
    pub translation_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_category: Option<FailureCategory>,
    #[serde(default)]
    pub failure_code: Option<FailureCode>,
    #[serde(default)]
    pub safe_message: Option<String>,
}

impl ChatMessage {
    pub fn new(
        id: impl Into<MessageId>,
        room_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            room_name: room_name.into(),
            content: content.into(),
            source_language: None,
            target_languages: Vec::new(),
            translation_status: TranslationStatus::None,
            translations: BTreeMap::new(),
            translation_job_id: None,
            translation_completed_at: None,
            failure_category: None,
            failure_code: None,
            safe_message: None,
        }
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    pub fn with_target_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_languages = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Requested targets, falling back to `defaults`, always including `"en"`.
    pub fn effective_targets(&self, defaults: &[String]) -> Vec<String> {
        let mut targets = if self.target_languages.is_empty() {
            defaults.to_vec()
        } else {
            self.target_languages.clone()
        };
        if !targets.iter().any(|t| t.trim().eq_ignore_ascii_case("en")) {
            targets.insert(0, "en".to_string());
        }
        targets
    }
}

/// A write of the translation fields of one message.
///
/// Applying an update replaces every translation field with the values it
/// carries, so absent fields are cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationStatusUpdate {
    pub message_id: MessageId,
    pub status: TranslationStatus,
    pub translations: Option<BTreeMap<String, String>>,
    pub job_id: Option<JobId>,
    pub completed_at: Option<DateTime<Utc>>,
    pub failure_category: Option<FailureCategory>,
    pub failure_code: Option<FailureCode>,
    pub safe_message: Option<String>,
}

impl TranslationStatusUpdate {
    fn bare(message_id: MessageId, status: TranslationStatus, job_id: JobId) -> Self {
        Self {
            message_id,
            status,
            translations: None,
            job_id: Some(job_id),
            completed_at: None,
            failure_category: None,
            failure_code: None,
            safe_message: None,
        }
    }

    pub fn pending(message_id: MessageId, job_id: JobId) -> Self {
        Self::bare(message_id, TranslationStatus::Pending, job_id)
    }

    pub fn in_progress(message_id: MessageId, job_id: JobId) -> Self {
        Self::bare(message_id, TranslationStatus::InProgress, job_id)
    }

    pub fn completed(
        message_id: MessageId,
        job_id: JobId,
        translations: BTreeMap<String, String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            translations: Some(translations),
            completed_at: Some(completed_at),
            ..Self::bare(message_id, TranslationStatus::Completed, job_id)
        }
    }

    pub fn failed(message_id: MessageId, job_id: JobId, failure: &FailureClassification) -> Self {
        Self {
            failure_category: Some(failure.category),
            failure_code: Some(failure.code),
            safe_message: Some(failure.safe_message.to_string()),
            ..Self::bare(message_id, TranslationStatus::Failed, job_id)
        }
    }

    /// Overwrite the translation fields of `message`.
    pub fn apply_to(&self, message: &mut ChatMessage) {
        message.translation_status = self.status;
        message.translations = self.translations.clone().unwrap_or_default();
        message.translation_job_id = self.job_id.clone();
        message.translation_completed_at = self.completed_at;
        message.failure_category = self.failure_category;
        message.failure_code = self.failure_code;
        message.safe_message = self.safe_message.clone();
    }
}

/// Read and write access to message entities.
///
/// Writes are last-write-wins.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn get_message(&self, id: &MessageId) -> PipelineResult<Option<ChatMessage>>;

    /// Apply `update` and return the updated entity.
    async fn update_translation_status(
        &self,
        update: TranslationStatusUpdate,
    ) -> PipelineResult<ChatMessage>;
}

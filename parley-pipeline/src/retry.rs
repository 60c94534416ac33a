//! User-triggered retry of failed translations.

use crate::error::PipelineError;
use crate::message::{ChatMessage, MessageStore, TranslationStatus, TranslationStatusUpdate};
use crate::notifier::RoomMembership;
use parley_config::PipelineSettings;
use parley_queue::{JobId, MessageId, MessageTranslationJob, TranslationQueue};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Why a manual retry was refused.
#[derive(Debug, Error)]
pub enum RetryError {
    #[error("Translation is disabled")]
    Disabled,

    #[error("Message {0} not found")]
    NotFound(MessageId),

    #[error("User is not a member of the message's room")]
    Forbidden,

    #[error("Only failed translations can be retried (status is {0:?})")]
    InvalidState(TranslationStatus),

    #[error(transparent)]
    Backend(#[from] PipelineError),
}

impl RetryError {
    /// HTTP status equivalent.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Disabled => 503,
            Self::NotFound(_) => 404,
            Self::Forbidden => 403,
            Self::InvalidState(_) => 400,
            Self::Backend(_) => 500,
        }
    }
}

/// Accepted retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryReceipt {
    pub message_id: MessageId,
    pub job_id: JobId,
    pub priority: i32,
}

/// Manual retry settings.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Priority given to manually retried jobs
    pub priority: i32,
    /// Targets used when the message requested none
    pub default_targets: Vec<String>,
    pub deployment_name: String,
}

impl From<&PipelineSettings> for RetryConfig {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            enabled: settings.enabled,
            priority: settings.manual_retry_priority,
            default_targets: settings.default_target_languages.clone(),
            deployment_name: settings.deployment_name.clone(),
        }
    }
}

/// Puts a failed message's translation back at the head of the queue.
#[derive(Clone)]
pub struct ManualRetryService {
    queue: TranslationQueue,
    messages: Arc<dyn MessageStore>,
    membership: Arc<dyn RoomMembership>,
    config: RetryConfig,
}

impl ManualRetryService {
    pub fn new(
        queue: TranslationQueue,
        messages: Arc<dyn MessageStore>,
        membership: Arc<dyn RoomMembership>,
        config: RetryConfig,
    ) -> Self {
        Self {
            queue,
            messages,
            membership,
            config,
        }
    }

    /// Retry the translation of `message_id` on behalf of `user_id`.
    ///
    /// Returns once the job is queued; processing happens in the worker.
    pub async fn retry(
        &self,
        message_id: &MessageId,
        user_id: &str,
    ) -> Result<RetryReceipt, RetryError> {
        if !self.config.enabled || !self.queue.is_enabled() {
            return Err(RetryError::Disabled);
        }

        let message = self
            .messages
            .get_message(message_id)
            .await?
            .ok_or_else(|| RetryError::NotFound(message_id.clone()))?;

        if !self.membership.is_member(user_id, &message.room_name).await? {
            return Err(RetryError::Forbidden);
        }

        if message.translation_status != TranslationStatus::Failed {
            return Err(RetryError::InvalidState(message.translation_status));
        }

        let job = self.build_job(&message);
        self.messages
            .update_translation_status(TranslationStatusUpdate::pending(
                message.id.clone(),
                job.job_id().clone(),
            ))
            .await?;

        if let Err(e) = self.queue.requeue(&job, true).await {
            error!(message_id = %message.id, error = %e, "manual retry could not be queued");
            self.restore_failed(&message).await;
            return Err(PipelineError::from(e).into());
        }

        info!(
            message_id = %message.id,
            job_id = %job.job_id(),
            priority = job.priority(),
            user_id,
            "manual translation retry queued"
        );

        Ok(RetryReceipt {
            message_id: message.id,
            job_id: job.job_id().clone(),
            priority: job.priority(),
        })
    }

    fn build_job(&self, message: &ChatMessage) -> MessageTranslationJob {
        MessageTranslationJob::new(
            message.id.clone(),
            message.room_name.as_str(),
            message.content.as_str(),
            message.effective_targets(&self.config.default_targets),
            self.config.deployment_name.as_str(),
        )
        .with_source_language(message.source_language.as_deref().unwrap_or_default())
        .with_priority(self.config.priority)
    }

    // Put back the failure the user saw so the retry can be attempted again.
    async fn restore_failed(&self, message: &ChatMessage) {
        let update = TranslationStatusUpdate {
            message_id: message.id.clone(),
            status: TranslationStatus::Failed,
            translations: Some(message.translations.clone()),
            job_id: message.translation_job_id.clone(),
            completed_at: message.translation_completed_at,
            failure_category: message.failure_category,
            failure_code: message.failure_code,
            safe_message: message.safe_message.clone(),
        };
        if let Err(e) = self.messages.update_translation_status(update).await {
            error!(message_id = %message.id, error = %e, "failed to restore failed status");
        }
    }
}

//! Wiring of queue, client and collaborators into one entry point.

use crate::classifier::FailureClassification;
use crate::error::PipelineResult;
use crate::message::{ChatMessage, MessageStore, TranslationStatusUpdate};
use crate::notifier::{RoomMembership, TranslationEvent, TranslationNotifier};
use crate::retry::{ManualRetryService, RetryConfig, RetryError, RetryReceipt};
use crate::worker::{TranslationWorker, WorkerConfig};
use parley_cache::{CacheConfig, RedisCache};
use parley_config::{PipelineSettings, Validate};
use parley_queue::{JobId, MessageId, MessageTranslationJob, QueueConfig, TranslationQueue};
use parley_translate::{ClientConfig, HttpTranslationProvider, ProviderConfig, TranslationClient};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// External collaborators the pipeline reports to.
#[derive(Clone)]
pub struct Collaborators {
    pub messages: Arc<dyn MessageStore>,
    pub notifier: Arc<dyn TranslationNotifier>,
    pub membership: Arc<dyn RoomMembership>,
}

/// The translation pipeline of one process.
#[derive(Clone)]
pub struct TranslationPipeline {
    queue: TranslationQueue,
    client: TranslationClient,
    collaborators: Collaborators,
    worker_config: WorkerConfig,
    retry: ManualRetryService,
    retry_config: RetryConfig,
}

impl TranslationPipeline {
    pub fn new(
        queue: TranslationQueue,
        client: TranslationClient,
        collaborators: Collaborators,
        worker_config: WorkerConfig,
        retry_config: RetryConfig,
    ) -> Self {
        let retry = ManualRetryService::new(
            queue.clone(),
            collaborators.messages.clone(),
            collaborators.membership.clone(),
            retry_config.clone(),
        );

        Self {
            queue,
            client,
            collaborators,
            worker_config,
            retry,
            retry_config,
        }
    }

    /// Build the Redis-backed queue and cache and the HTTP provider from `settings`.
    pub async fn connect(
        settings: &PipelineSettings,
        collaborators: Collaborators,
    ) -> PipelineResult<Self> {
        settings.validate()?;

        let queue_config = QueueConfig::new(settings.redis_url.as_str(), settings.queue_name.as_str())
            .with_key_prefix(settings.key_prefix.as_str())
            .with_enabled(settings.enabled);
        let queue = TranslationQueue::connect(queue_config).await?;

        let cache = RedisCache::new(
            CacheConfig::redis(settings.redis_url.as_str())
                .with_key_prefix(settings.key_prefix.as_str())
                .with_default_ttl(settings.cache_ttl()),
        )
        .await?;

        let mut provider_config = ProviderConfig::new(settings.endpoint.as_str(), settings.api_key.as_str())
            .with_api_version(settings.api_version.as_str())
            .with_timeout(settings.provider_timeout());
        if let Some(region) = &settings.region {
            provider_config = provider_config.with_region(region.as_str());
        }
        if !provider_config.is_configured() {
            warn!("translation endpoint not configured; jobs will fail until it is set");
        }
        let provider = HttpTranslationProvider::new(provider_config)?;

        let client = TranslationClient::new(
            Arc::new(provider),
            ClientConfig::default()
                .with_provider_timeout(settings.provider_timeout())
                .with_cache_ttl(settings.cache_ttl()),
        )
        .with_cache(Arc::new(cache));

        info!(
            enabled = settings.enabled,
            queue = %settings.queue_name,
            concurrency = settings.max_concurrent_jobs,
            "translation pipeline connected"
        );

        Ok(Self::new(
            queue,
            client,
            collaborators,
            WorkerConfig::from(settings),
            RetryConfig::from(settings),
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.retry_config.enabled && self.queue.is_enabled()
    }

    pub fn queue(&self) -> &TranslationQueue {
        &self.queue
    }

    pub fn client(&self) -> &TranslationClient {
        &self.client
    }

    /// Queue translation of a newly created message.
    ///
    /// Returns the job id, or `None` when translation is disabled.
    pub async fn submit(&self, message: &ChatMessage) -> PipelineResult<Option<JobId>> {
        if !self.is_enabled() {
            debug!(message_id = %message.id, "translation disabled, not queueing");
            return Ok(None);
        }

        let mut job = MessageTranslationJob::new(
            message.id.clone(),
            message.room_name.as_str(),
            message.content.as_str(),
            message.effective_targets(&self.retry_config.default_targets),
            self.retry_config.deployment_name.as_str(),
        );
        if let Some(source) = &message.source_language {
            job = job.with_source_language(source);
        }

        self.collaborators
            .messages
            .update_translation_status(TranslationStatusUpdate::pending(
                message.id.clone(),
                job.job_id().clone(),
            ))
            .await?;

        if let Err(e) = self.queue.enqueue(&job).await {
            error!(message_id = %message.id, error = %e, "translation job could not be queued");
            self.mark_unqueued(message, &job).await;
            return Err(e.into());
        }

        debug!(message_id = %message.id, job_id = %job.job_id(), "translation job queued");
        Ok(Some(job.job_id().clone()))
    }

    // A Pending message without a job would be stuck; Failed can be retried by hand.
    async fn mark_unqueued(&self, message: &ChatMessage, job: &MessageTranslationJob) {
        let failure = FailureClassification::queue_unavailable();
        let update =
            TranslationStatusUpdate::failed(message.id.clone(), job.job_id().clone(), &failure);
        if let Err(e) = self.collaborators.messages.update_translation_status(update).await {
            error!(message_id = %message.id, error = %e, "failed to mark unqueued message failed");
        }

        let event = TranslationEvent::Failed {
            message_id: message.id.clone(),
            failure_category: failure.category,
            failure_code: failure.code,
            safe_message: failure.safe_message.to_string(),
        };
        if let Err(e) = self
            .collaborators
            .notifier
            .notify_room(&message.room_name, &event)
            .await
        {
            warn!(message_id = %message.id, error = %e, "failed to notify room");
        }
    }

    /// Manual retry of a failed message.
    pub async fn retry(
        &self,
        message_id: &MessageId,
        user_id: &str,
    ) -> Result<RetryReceipt, RetryError> {
        self.retry.retry(message_id, user_id).await
    }

    /// A worker sharing this pipeline's queue, client and collaborators.
    pub fn worker(&self) -> TranslationWorker {
        TranslationWorker::new(
            self.queue.clone(),
            self.client.clone(),
            self.collaborators.messages.clone(),
            self.collaborators.notifier.clone(),
            self.worker_config.clone(),
        )
    }

    /// Jobs currently waiting.
    pub async fn queue_length(&self) -> PipelineResult<usize> {
        Ok(self.queue.len().await?)
    }
}

//! Translation queue over a [`JobStore`].

use crate::error::{QueueError, QueueResult};
use crate::job::MessageTranslationJob;
use crate::redis_store::RedisJobStore;
use crate::store::JobStore;
use chrono::Utc;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// When `false` every operation short-circuits without touching the store
    pub enabled: bool,

    /// Redis connection URL
    pub redis_url: String,

    /// Queue name
    pub queue_name: String,

    /// Key prefix for Redis keys
    pub key_prefix: String,
}

impl QueueConfig {
    pub fn new(redis_url: impl Into<String>, queue_name: impl Into<String>) -> Self {
        Self {
            enabled: true,
            redis_url: redis_url.into(),
            queue_name: queue_name.into(),
            key_prefix: "parley".to_string(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Redis key of the job list.
    pub fn list_key(&self) -> String {
        format!("{}:{}", self.key_prefix, self.queue_name)
    }
}

/// FIFO queue with head insertion for high-priority requeues.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct TranslationQueue {
    store: Arc<dyn JobStore>,
    config: QueueConfig,
}

impl TranslationQueue {
    pub fn new(store: Arc<dyn JobStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// Open a Redis-backed queue.
    pub async fn connect(config: QueueConfig) -> QueueResult<Self> {
        info!(queue = %config.queue_name, "initializing translation queue");
        let store = RedisJobStore::connect(&config.redis_url, config.list_key()).await?;
        Ok(Self::new(Arc::new(store), config))
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Append a job to the tail.
    pub async fn enqueue(&self, job: &MessageTranslationJob) -> QueueResult<()> {
        if !self.config.enabled {
            return Err(QueueError::Unavailable);
        }

        let payload = job.to_payload()?;
        self.store.push_back(payload).await?;
        debug!(job_id = %job.job_id(), message_id = %job.message_id(), "job enqueued");
        Ok(())
    }

    /// Remove and return the head job, or `None` when nothing is eligible.
    ///
    /// The token is checked before the store is called; the pop itself cannot
    /// be interrupted. A head job whose retry delay has not elapsed is moved
    /// to the tail and `None` is returned. If that move fails the job is
    /// returned anyway.
    pub async fn dequeue(
        &self,
        cancel: &CancellationToken,
    ) -> QueueResult<Option<MessageTranslationJob>> {
        if !self.config.enabled {
            return Ok(None);
        }

        loop {
            if cancel.is_cancelled() {
                return Ok(None);
            }

            let Some(payload) = self.store.pop_front().await? else {
                return Ok(None);
            };

            let job = match MessageTranslationJob::from_payload(&payload) {
                Ok(job) => job,
                Err(e) => {
                    // Poison payloads would otherwise block the head forever.
                    error!(queue = %self.config.queue_name, error = %e, "dropping malformed job payload");
                    continue;
                }
            };

            if !job.is_ready_at(Utc::now()) {
                // The job is already off the list; hand it out early rather than lose it.
                if let Err(e) = self.store.push_back(payload).await {
                    warn!(
                        job_id = %job.job_id(),
                        error = %e,
                        "failed to rotate delayed job, delivering it early"
                    );
                    return Ok(Some(job));
                }
                return Ok(None);
            }

            return Ok(Some(job));
        }
    }

    /// Put a job back: at the head when `high_priority`, else at the tail.
    pub async fn requeue(&self, job: &MessageTranslationJob, high_priority: bool) -> QueueResult<()> {
        if !self.config.enabled {
            return Err(QueueError::Unavailable);
        }

        let payload = job.to_payload()?;
        if high_priority {
            self.store.push_front(payload).await?;
        } else {
            self.store.push_back(payload).await?;
        }

        debug!(
            job_id = %job.job_id(),
            retry_count = job.retry_count(),
            high_priority,
            "job requeued"
        );
        Ok(())
    }

    /// Current depth; `0` when disabled.
    pub async fn len(&self) -> QueueResult<usize> {
        if !self.config.enabled {
            return Ok(0);
        }
        self.store.len().await
    }

    pub async fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len().await? == 0)
    }

    /// Drop every queued job.
    pub async fn clear(&self) -> QueueResult<()> {
        if !self.config.enabled {
            return Err(QueueError::Unavailable);
        }
        self.store.clear().await
    }
}

//! Background worker draining the translation queue.

use crate::classifier::{FailureClassification, classify};
use crate::message::{MessageStore, TranslationStatus, TranslationStatusUpdate};
use crate::notifier::{TranslationEvent, TranslationNotifier};
use chrono::Utc;
use parley_config::PipelineSettings;
use parley_queue::{MessageTranslationJob, TranslationQueue};
use parley_translate::{TranslateError, TranslateRequest, TranslateResponse, TranslationClient};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Jobs processed at the same time by this process
    pub max_concurrent_jobs: usize,

    /// Automatic retries allowed per job
    pub max_retries: u32,

    /// Delay before a retried job becomes eligible again
    pub retry_delay: Duration,

    /// Upper bound on one job's translation
    pub job_timeout: Duration,

    /// Pause after an empty or failed dequeue
    pub poll_interval: Duration,

    /// Tone passed to every target
    pub tone: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
            job_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(500),
            tone: None,
        }
    }
}

impl From<&PipelineSettings> for WorkerConfig {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            max_concurrent_jobs: settings.max_concurrent_jobs,
            max_retries: settings.max_retries,
            retry_delay: settings.retry_delay(),
            job_timeout: settings.job_timeout(),
            poll_interval: settings.poll_interval(),
            tone: settings.tone.clone(),
        }
    }
}

/// Counters maintained by a worker.
#[derive(Debug, Default)]
pub struct WorkerStats {
    processed: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
    requeued_on_shutdown: AtomicU64,
}

/// Point-in-time copy of [`WorkerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStatsSnapshot {
    pub processed: u64,
    pub completed: u64,
    pub failed: u64,
    pub retried: u64,
    pub requeued_on_shutdown: u64,
}

impl WorkerStats {
    pub fn snapshot(&self) -> WorkerStatsSnapshot {
        WorkerStatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            requeued_on_shutdown: self.requeued_on_shutdown.load(Ordering::Relaxed),
        }
    }

    fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// What happened to one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// Requeued at the tail for another automatic attempt
    Retried,
    Failed,
    /// Put back at the head because the worker is stopping
    RequeuedOnShutdown,
}

struct WorkerInner {
    queue: TranslationQueue,
    client: TranslationClient,
    messages: Arc<dyn MessageStore>,
    notifier: Arc<dyn TranslationNotifier>,
    config: WorkerConfig,
    stats: WorkerStats,
}

/// Consumer that drives queued jobs to a terminal outcome.
///
/// Cloning is cheap; clones share configuration and stats.
#[derive(Clone)]
pub struct TranslationWorker {
    inner: Arc<WorkerInner>,
}

impl TranslationWorker {
    pub fn new(
        queue: TranslationQueue,
        client: TranslationClient,
        messages: Arc<dyn MessageStore>,
        notifier: Arc<dyn TranslationNotifier>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(WorkerInner {
                queue,
                client,
                messages,
                notifier,
                config,
                stats: WorkerStats::default(),
            }),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.inner.config
    }

    pub fn stats(&self) -> WorkerStatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Run until `shutdown` is cancelled, then wait for in-flight jobs.
    pub async fn run(&self, shutdown: CancellationToken) {
        let capacity = self.inner.config.max_concurrent_jobs.max(1);
        let slots = Arc::new(Semaphore::new(capacity));
        let mut tasks = JoinSet::new();

        info!(
            concurrency = capacity,
            queue = %self.inner.queue.config().queue_name,
            "translation worker started"
        );

        loop {
            while let Some(result) = tasks.try_join_next() {
                if let Err(e) = result {
                    error!(error = %e, "translation task panicked");
                }
            }

            let permit = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                permit = slots.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            match self.inner.queue.dequeue(&shutdown).await {
                Ok(Some(job)) => {
                    let inner = self.inner.clone();
                    let token = shutdown.clone();
                    tasks.spawn(async move {
                        let _permit = permit;
                        inner.process(job, &token).await;
                    });
                }
                Ok(None) => {
                    drop(permit);
                    if self.pause(&shutdown).await {
                        break;
                    }
                }
                Err(e) => {
                    drop(permit);
                    error!(error = %e, "failed to dequeue translation job");
                    if self.pause(&shutdown).await {
                        break;
                    }
                }
            }
        }

        let in_flight = tasks.len();
        if in_flight > 0 {
            info!(in_flight, "waiting for in-flight translation jobs");
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "translation task panicked");
            }
        }

        info!(stats = ?self.stats(), "translation worker stopped");
    }

    /// Process one job to its outcome.
    pub async fn process(
        &self,
        job: MessageTranslationJob,
        shutdown: &CancellationToken,
    ) -> JobOutcome {
        self.inner.process(job, shutdown).await
    }

    // Returns true when shutdown was requested during the pause.
    async fn pause(&self, shutdown: &CancellationToken) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => true,
            _ = tokio::time::sleep(self.inner.config.poll_interval) => false,
        }
    }
}

impl WorkerInner {
    async fn process(&self, job: MessageTranslationJob, shutdown: &CancellationToken) -> JobOutcome {
        WorkerStats::incr(&self.stats.processed);
        debug!(
            job_id = %job.job_id(),
            message_id = %job.message_id(),
            retry_count = job.retry_count(),
            "processing translation job"
        );

        self.mark_in_progress(&job).await;

        let request = TranslateRequest::for_languages(
            job.content(),
            job.source_language(),
            job.target_languages(),
            job.deployment_name(),
            self.config.tone.as_deref(),
        );

        let result = match tokio::time::timeout(
            self.config.job_timeout,
            self.client.translate(&request, shutdown),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TranslateError::Timeout(self.config.job_timeout)),
        };

        match result {
            Ok(response) => self.complete(&job, response).await,
            Err(TranslateError::Cancelled) if shutdown.is_cancelled() => {
                self.requeue_on_shutdown(&job).await
            }
            Err(e) => self.handle_failure(&job, e).await,
        }
    }

    async fn mark_in_progress(&self, job: &MessageTranslationJob) {
        match self.messages.get_message(job.message_id()).await {
            Ok(Some(message))
                if !matches!(
                    message.translation_status,
                    TranslationStatus::Pending | TranslationStatus::InProgress
                ) =>
            {
                debug!(
                    message_id = %job.message_id(),
                    status = ?message.translation_status,
                    "message not pending, overwriting status"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(message_id = %job.message_id(), error = %e, "failed to load message"),
        }

        let update =
            TranslationStatusUpdate::in_progress(job.message_id().clone(), job.job_id().clone());
        if let Err(e) = self.messages.update_translation_status(update).await {
            warn!(message_id = %job.message_id(), error = %e, "failed to mark message in progress");
        }
    }

    async fn complete(&self, job: &MessageTranslationJob, response: TranslateResponse) -> JobOutcome {
        let update = TranslationStatusUpdate::completed(
            job.message_id().clone(),
            job.job_id().clone(),
            response.translations.clone(),
            Utc::now(),
        );
        if let Err(e) = self.messages.update_translation_status(update).await {
            error!(message_id = %job.message_id(), error = %e, "failed to persist completed translation");
        }

        let event = TranslationEvent::Completed {
            message_id: job.message_id().clone(),
            translations: response.translations,
        };
        self.notify(job, &event).await;

        WorkerStats::incr(&self.stats.completed);
        info!(
            job_id = %job.job_id(),
            message_id = %job.message_id(),
            from_cache = response.from_cache,
            "translation completed"
        );
        JobOutcome::Completed
    }

    async fn handle_failure(&self, job: &MessageTranslationJob, err: TranslateError) -> JobOutcome {
        let failure = classify(&err);
        warn!(
            job_id = %job.job_id(),
            message_id = %job.message_id(),
            category = %failure.category,
            code = %failure.code,
            retryable = failure.is_retryable,
            error = %err,
            "translation attempt failed"
        );

        if failure.is_retryable && job.retry_count() < self.config.max_retries {
            let next = job.next_attempt(self.config.retry_delay);
            match self.queue.requeue(&next, false).await {
                Ok(()) => {
                    WorkerStats::incr(&self.stats.retried);
                    info!(
                        job_id = %job.job_id(),
                        retry_count = next.retry_count(),
                        max_retries = self.config.max_retries,
                        "translation job scheduled for retry"
                    );
                    return JobOutcome::Retried;
                }
                Err(e) => {
                    error!(job_id = %job.job_id(), error = %e, "failed to requeue job for retry");
                }
            }
        }

        self.fail(job, &failure).await
    }

    async fn fail(&self, job: &MessageTranslationJob, failure: &FailureClassification) -> JobOutcome {
        let update =
            TranslationStatusUpdate::failed(job.message_id().clone(), job.job_id().clone(), failure);
        if let Err(e) = self.messages.update_translation_status(update).await {
            error!(message_id = %job.message_id(), error = %e, "failed to persist translation failure");
        }

        let event = TranslationEvent::Failed {
            message_id: job.message_id().clone(),
            failure_category: failure.category,
            failure_code: failure.code,
            safe_message: failure.safe_message.to_string(),
        };
        self.notify(job, &event).await;

        WorkerStats::incr(&self.stats.failed);
        JobOutcome::Failed
    }

    async fn requeue_on_shutdown(&self, job: &MessageTranslationJob) -> JobOutcome {
        // Not raced against shutdown: the job must make it back to the queue.
        match self.queue.requeue(job, true).await {
            Ok(()) => {
                WorkerStats::incr(&self.stats.requeued_on_shutdown);
                info!(job_id = %job.job_id(), "job requeued at head on shutdown");
            }
            Err(e) => {
                error!(job_id = %job.job_id(), error = %e, "failed to requeue job on shutdown");
                return self.fail(job, &FailureClassification::queue_unavailable()).await;
            }
        }
        JobOutcome::RequeuedOnShutdown
    }

    async fn notify(&self, job: &MessageTranslationJob, event: &TranslationEvent) {
        if let Err(e) = self.notifier.notify_room(job.room_name(), event).await {
            warn!(
                message_id = %job.message_id(),
                event = event.name(),
                error = %e,
                "failed to notify room"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_settings() {
        let settings = PipelineSettings {
            max_concurrent_jobs: 8,
            retry_delay_seconds: 0,
            tone: Some("formal".to_string()),
            ..PipelineSettings::default()
        };
        let config = WorkerConfig::from(&settings);

        assert_eq!(config.max_concurrent_jobs, 8);
        assert_eq!(config.retry_delay, Duration::ZERO);
        assert_eq!(config.tone.as_deref(), Some("formal"));
    }

    #[test]
    fn test_stats_snapshot_starts_at_zero() {
        assert_eq!(WorkerStats::default().snapshot(), WorkerStatsSnapshot::default());
    }
}

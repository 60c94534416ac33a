//! Durable job queue for message translation.
//!
//! Jobs are JSON-encoded [`MessageTranslationJob`] payloads kept in a shared
//! list (a Redis LIST in production). Normal enqueues and requeues append to
//! the tail; a high-priority requeue prepends to the head so it overtakes the
//! backlog. Any number of processes may enqueue and dequeue concurrently; the
//! store's atomic pop is the only coordination.
//!
//! ```
//! use parley_queue::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> QueueResult<()> {
//! let config = QueueConfig::new("redis://localhost:6379", "translations");
//! let queue = TranslationQueue::new(Arc::new(InMemoryJobStore::new()), config);
//!
//! let job = MessageTranslationJob::new("msg-1", "general", "Hello", ["en", "pl"], "gpt-4o-mini");
//! queue.enqueue(&job).await?;
//!
//! let next = queue.dequeue(&CancellationToken::new()).await?;
//! assert_eq!(next.as_ref().map(|j| j.job_id()), Some(job.job_id()));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod job;
pub mod queue;
pub mod redis_store;
pub mod store;

pub use error::{QueueError, QueueResult};
pub use job::{
    AUTO_DETECT, DEFAULT_PRIORITY, JobId, MessageId, MessageTranslationJob, normalize_language,
};
pub use queue::{QueueConfig, TranslationQueue};
pub use redis_store::RedisJobStore;
pub use store::{InMemoryJobStore, JobStore};

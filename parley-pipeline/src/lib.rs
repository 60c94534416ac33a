//! Message translation pipeline.
//!
//! A chat message is turned into a [`MessageTranslationJob`](parley_queue::MessageTranslationJob)
//! and queued. A [`TranslationWorker`] drains the queue with bounded
//! concurrency, translates through a
//! [`TranslationClient`](parley_translate::TranslationClient), and records the
//! outcome on the message through a [`MessageStore`]. Failures are
//! [classified](classify): retryable ones go back to the queue until the retry
//! budget runs out, the rest mark the message `Failed`. A user may then
//! trigger a [manual retry](ManualRetryService), which jumps the queue.
//!
//! ```no_run
//! use parley_config::SettingsLoader;
//! use parley_pipeline::*;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = SettingsLoader::new().with_dotenv().load()?;
//! let collaborators = Collaborators {
//!     messages: Arc::new(InMemoryMessageStore::new()),
//!     notifier: Arc::new(RecordingNotifier::new()),
//!     membership: Arc::new(StaticMembership::new()),
//! };
//!
//! let pipeline = TranslationPipeline::connect(&settings, collaborators).await?;
//! let shutdown = CancellationToken::new();
//! let worker = tokio::spawn({
//!     let worker = pipeline.worker();
//!     let shutdown = shutdown.clone();
//!     async move { worker.run(shutdown).await }
//! });
//!
//! shutdown.cancel();
//! worker.await?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod error;
pub mod memory;
pub mod message;
pub mod notifier;
pub mod pipeline;
pub mod retry;
pub mod worker;

pub use classifier::{FailureCategory, FailureClassification, FailureCode, classify};
pub use error::{PipelineError, PipelineResult};
pub use memory::{InMemoryMessageStore, RecordingNotifier, StaticMembership};
pub use message::{ChatMessage, MessageStore, TranslationStatus, TranslationStatusUpdate};
pub use notifier::{RoomMembership, TranslationEvent, TranslationNotifier};
pub use pipeline::{Collaborators, TranslationPipeline};
pub use retry::{ManualRetryService, RetryConfig, RetryError, RetryReceipt};
pub use worker::{JobOutcome, TranslationWorker, WorkerConfig, WorkerStats, WorkerStatsSnapshot};

// Parley - asynchronous message-translation job pipeline
//
// Chat messages are queued as translation jobs, worked off with bounded
// concurrency against an external translation API, retried or failed
// according to a fixed classification, and cached by request fingerprint.

pub use parley_pipeline::*;

pub use parley_cache;
pub use parley_config;
pub use parley_pipeline;
pub use parley_queue;
pub use parley_translate;

#[cfg(feature = "log")]
pub use parley_log;

/// Commonly used items.
pub mod prelude {
    pub use parley_config::{PipelineSettings, SettingsLoader, Validate};
    pub use parley_pipeline::{
        ChatMessage, Collaborators, FailureCategory, FailureCode, JobOutcome, ManualRetryService,
        MessageStore, RetryError, RetryReceipt, RoomMembership, TranslationEvent,
        TranslationNotifier, TranslationPipeline, TranslationStatus, TranslationWorker,
        WorkerConfig, classify,
    };
    pub use parley_queue::{JobId, MessageId, MessageTranslationJob, QueueConfig, TranslationQueue};
    pub use parley_translate::{
        SourceLanguage, TranslateError, TranslateRequest, TranslateResponse, TranslateTarget,
        TranslationClient,
    };
}

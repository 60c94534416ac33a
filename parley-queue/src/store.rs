//! Job store abstraction and the in-memory backend.

use crate::error::{QueueError, QueueResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A shared list of serialized jobs.
///
/// Implementations must make [`pop_front`](Self::pop_front) atomic: two
/// concurrent callers never receive the same payload.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Append to the tail.
    async fn push_back(&self, payload: String) -> QueueResult<()>;

    /// Prepend to the head.
    async fn push_front(&self, payload: String) -> QueueResult<()>;

    /// Remove and return the head, or `None` when empty.
    async fn pop_front(&self) -> QueueResult<Option<String>>;

    /// Number of stored payloads.
    async fn len(&self) -> QueueResult<usize>;

    /// Remove every payload.
    async fn clear(&self) -> QueueResult<()>;
}

/// Process-local store, used by tests and single-instance deployments.
#[derive(Default)]
pub struct InMemoryJobStore {
    items: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of store operations performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent operation fail, simulating a lost connection.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Copy of the stored payloads, head first.
    pub fn snapshot(&self) -> Vec<String> {
        self.items.lock().iter().cloned().collect()
    }

    fn begin(&self) -> QueueResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(QueueError::Backend("in-memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn push_back(&self, payload: String) -> QueueResult<()> {
        self.begin()?;
        self.items.lock().push_back(payload);
        Ok(())
    }

    async fn push_front(&self, payload: String) -> QueueResult<()> {
        self.begin()?;
        self.items.lock().push_front(payload);
        Ok(())
    }

    async fn pop_front(&self) -> QueueResult<Option<String>> {
        self.begin()?;
        Ok(self.items.lock().pop_front())
    }

    async fn len(&self) -> QueueResult<usize> {
        self.begin()?;
        Ok(self.items.lock().len())
    }

    async fn clear(&self) -> QueueResult<()> {
        self.begin()?;
        self.items.lock().clear();
        Ok(())
    }
}

//! Redis LIST backend.

use crate::error::{QueueError, QueueResult};
use crate::store::JobStore;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};

/// Job store backed by a single Redis LIST.
///
/// Tail appends use `RPUSH`, head insertion `LPUSH`, dequeue `LPOP`. `LPOP`
/// is atomic on the server, which is what keeps two workers from receiving
/// the same job. It is not interruptible once sent.
#[derive(Clone)]
pub struct RedisJobStore {
    connection: ConnectionManager,
    key: String,
}

impl RedisJobStore {
    /// Connect to Redis and use `key` as the list.
    pub async fn connect(redis_url: &str, key: impl Into<String>) -> QueueResult<Self> {
        let client = Client::open(redis_url).map_err(|e| QueueError::Config(e.to_string()))?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self::with_connection(connection, key))
    }

    /// Reuse an existing connection manager.
    pub fn with_connection(connection: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            connection,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn push_back(&self, payload: String) -> QueueResult<()> {
        let mut conn = self.connection.clone();
        let _: usize = conn.rpush(&self.key, payload).await?;
        Ok(())
    }

    async fn push_front(&self, payload: String) -> QueueResult<()> {
        let mut conn = self.connection.clone();
        let _: usize = conn.lpush(&self.key, payload).await?;
        Ok(())
    }

    async fn pop_front(&self) -> QueueResult<Option<String>> {
        let mut conn = self.connection.clone();
        let payload: Option<String> = conn.lpop(&self.key, None).await?;
        Ok(payload)
    }

    async fn len(&self) -> QueueResult<usize> {
        let mut conn = self.connection.clone();
        let len: usize = conn.llen(&self.key).await?;
        Ok(len)
    }

    async fn clear(&self) -> QueueResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(&self.key).await?;
        Ok(())
    }
}

//! Packaging queue over a Redis sorted set.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use packline_models::QueueMessage;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{QueueError, QueueResult};

/// Queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Redis URL
    pub redis_url: String,
    /// Sorted-set key holding pending packaging messages
    pub queue_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            queue_name: "packaging-queue".to_string(),
        }
    }
}

impl QueueConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            queue_name: std::env::var("REDIS_QUEUE_NAME")
                .unwrap_or_else(|_| "packaging-queue".to_string()),
        }
    }
}

/// The message broker seam the worker polls against.
///
/// Implementations must tolerate repeated `connect` calls; the worker invokes
/// it from its backoff loop on every reconnect attempt.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Establish (or verify) the broker connection.
    async fn connect(&self) -> QueueResult<()>;

    /// Drop the connection. Pending pops finish their current wait.
    async fn disconnect(&self);

    /// Blocking dequeue with a bounded wait. `Ok(None)` means the wait timed
    /// out with an empty queue.
    async fn pop(&self, timeout: Duration) -> QueueResult<Option<String>>;

    /// Submit a message, used by the manual retry path.
    async fn enqueue(&self, message: &QueueMessage) -> QueueResult<()>;

    /// Connectivity status for the readiness probe.
    fn is_connected(&self) -> bool;
}

/// Redis sorted-set broker. Messages are popped lowest-score-first with
/// `BZPOPMIN`; the connection is established lazily and reused across
/// iterations.
pub struct RedisBroker {
    client: redis::Client,
    config: QueueConfig,
    conn: Mutex<Option<MultiplexedConnection>>,
    connected: AtomicBool,
}

impl RedisBroker {
    pub fn new(config: QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self {
            client,
            config,
            conn: Mutex::new(None),
            connected: AtomicBool::new(false),
        })
    }

    pub fn from_env() -> QueueResult<Self> {
        Self::new(QueueConfig::from_env())
    }

    async fn connection(&self) -> QueueResult<MultiplexedConnection> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .inspect_err(|_| self.connected.store(false, Ordering::SeqCst))?;
        info!(queue = %self.config.queue_name, "connected to redis");
        *guard = Some(conn.clone());
        self.connected.store(true, Ordering::SeqCst);
        Ok(conn)
    }

    async fn drop_connection(&self) {
        let mut guard = self.conn.lock().await;
        *guard = None;
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn connect(&self) -> QueueResult<()> {
        self.connection().await?;
        Ok(())
    }

    async fn disconnect(&self) {
        self.drop_connection().await;
        debug!("disconnected from redis");
    }

    async fn pop(&self, timeout: Duration) -> QueueResult<Option<String>> {
        let mut conn = self.connection().await?;
        let reply: Result<Option<(String, String, f64)>, redis::RedisError> =
            redis::cmd("BZPOPMIN")
                .arg(&self.config.queue_name)
                .arg(timeout.as_secs_f64())
                .query_async(&mut conn)
                .await;
        match reply {
            Ok(reply) => Ok(reply.map(|(_, payload, _)| payload)),
            Err(e) => {
                // Invalidate the cached handle so the next attempt reconnects.
                warn!(error = %e, "dequeue failed");
                self.drop_connection().await;
                Err(QueueError::Redis(e))
            }
        }
    }

    async fn enqueue(&self, message: &QueueMessage) -> QueueResult<()> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(message)?;
        let score = chrono::Utc::now().timestamp_millis();
        redis::cmd("ZADD")
            .arg(&self.config.queue_name)
            .arg(score)
            .arg(&payload)
            .query_async::<()>(&mut conn)
            .await?;
        info!(job_id = %message.job_id, "enqueued packaging message");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

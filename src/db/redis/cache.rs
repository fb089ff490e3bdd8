use chrono::NaiveDate;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::error::AppResult;

/// Bumped whenever the cached JSON shape of [`crate::models::Event`] changes
const KEY_VERSION: u32 = 1;

/// Upper bound on a cache lookup before the caller computes the value itself
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Most queued writes sent to Redis in one pipeline
const MAX_WRITE_BATCH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Candidate events dated on or after the given day
    UpcomingEvents(NaiveDate),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::UpcomingEvents(from) => {
                write!(f, "helping-hands:v{}:events:upcoming:{}", KEY_VERSION, from)
            }
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

struct CacheWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache in front of the event store
///
/// Reads hit Redis directly. Writes are queued to a background task that
/// keeps one connection open and pipelines whatever has accumulated.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWrite>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task and waits until queued writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    ///
    /// No connection is made here; an unreachable Redis only shows up as
    /// failed lookups and logged write errors.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(CacheWriter::new(redis_client.clone()).run(write_rx, shutdown_rx));

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx, task })
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent. A lookup slower than
    /// [`READ_TIMEOUT`] is reported as an error.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let lookup = async {
            let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
            let cached: Option<String> = conn.get(key.to_string()).await?;
            Ok::<_, AppError>(cached)
        };

        let cached = tokio::time::timeout(READ_TIMEOUT, lookup)
            .await
            .map_err(|_| AppError::Internal(format!("Cache read of {} timed out", key)))??;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Queues a value for storage without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let write = CacheWrite {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer stopped, dropping write");
        }
    }
}

/// Background side of [`Cache`]
struct CacheWriter {
    client: Client,
    conn: Option<MultiplexedConnection>,
}

impl CacheWriter {
    fn new(client: Client) -> Self {
        Self { client, conn: None }
    }

    async fn run(
        mut self,
        mut write_rx: mpsc::UnboundedReceiver<CacheWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(first) = write_rx.recv() => {
                    let mut batch = vec![first];
                    while batch.len() < MAX_WRITE_BATCH {
                        match write_rx.try_recv() {
                            Ok(write) => batch.push(write),
                            Err(_) => break,
                        }
                    }
                    self.flush(batch).await;
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut remaining = Vec::new();
                    while let Some(write) = write_rx.recv().await {
                        remaining.push(write);
                    }

                    let count = remaining.len();
                    if !remaining.is_empty() {
                        self.flush(remaining).await;
                    }
                    tracing::info!(flushed = count, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn flush(&mut self, batch: Vec<CacheWrite>) {
        let count = batch.len();
        if let Err(e) = self.write_batch(batch).await {
            tracing::error!(error = %e, count, "Failed to write to Redis cache");
        }
    }

    /// A failed write drops the connection so the next batch reconnects
    async fn write_batch(&mut self, batch: Vec<CacheWrite>) -> AppResult<()> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.client.get_multiplexed_async_connection().await?,
        };

        let mut pipe = redis::pipe();
        for write in batch {
            pipe.set_ex(write.key, write.value, write.ttl).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;

        self.conn = Some(conn);
        Ok(())
    }
}

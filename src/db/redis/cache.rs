use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::{DiscoverQuery, Listing, MediaKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    Details(MediaKind, u64),
    Credits(MediaKind, u64),
    Similar(MediaKind, u64),
    Trailer(MediaKind, u64),
    PersonCredits(u64),
    Discover(MediaKind, DiscoverQuery),
    Search(String),
    Genres(MediaKind),
    Season(u64, u32),
    Listing(Listing, u32),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Details(kind, id) => write!(f, "details:{}:{}", kind.api_segment(), id),
            CacheKey::Credits(kind, id) => write!(f, "credits:{}:{}", kind.api_segment(), id),
            CacheKey::Similar(kind, id) => write!(f, "similar:{}:{}", kind.api_segment(), id),
            CacheKey::Trailer(kind, id) => write!(f, "trailer:{}:{}", kind.api_segment(), id),
            CacheKey::PersonCredits(id) => write!(f, "person:{}", id),
            CacheKey::Discover(kind, query) => write!(
                f,
                "discover:{}:{}",
                kind.api_segment(),
                query
                    .to_params()
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("&")
            ),
            CacheKey::Search(query) => write!(f, "search:{}", query.trim().to_lowercase()),
            CacheKey::Genres(kind) => write!(f, "genres:{}", kind.api_segment()),
            CacheKey::Season(series_id, season) => write!(f, "season:{}:{}", series_id, season),
            CacheKey::Listing(listing, page) => write!(f, "listing:{}:{}", listing, page),
        }
    }
}

/// Connects to Redis and returns a shared, self-reconnecting connection
///
/// Clones of the manager multiplex over one connection, so the cache and the
/// last-watched store share it instead of dialling Redis per operation.
pub async fn create_connection_manager(redis_url: &str) -> anyhow::Result<ConnectionManager> {
    let client = Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Sends a shutdown signal to the writer task, which flushes pending writes
    /// before exiting.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a new Cache instance with an async write background task
    ///
    /// Writes go through a channel to a spawned task so responses never wait on Redis.
    pub async fn new(conn: ConnectionManager) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_conn = conn.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(writer_conn, write_rx, shutdown_rx).await;
        });

        let cache = Self { conn, write_tx };

        let handle = CacheWriterHandle { shutdown_tx };

        (cache, handle)
    }

    /// Background task that processes cache write messages
    ///
    /// On shutdown signal, drains whatever is already queued before exiting.
    async fn cache_writer_task(
        mut conn: ConnectionManager,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");
        let mut failed_writes: u64 = 0;

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&mut conn, msg).await {
                        failed_writes += 1;
                        tracing::error!(error = %e, failed_writes = failed_writes, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!(failed_writes = failed_writes, "Cache writer shutting down, flushing remaining writes");

                    while let Ok(msg) = write_rx.try_recv() {
                        if let Err(e) = Self::write_to_redis(&mut conn, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Writes a single message to Redis
    async fn write_to_redis(conn: &mut ConnectionManager, msg: CacheWriteMessage) -> AppResult<()> {
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// The value is serialized here and handed to the writer task; this method
    /// returns immediately and write failures are only logged.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: format!("{}", key),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoverSort, TrendingScope};

    #[test]
    fn test_cache_key_display_item_keys() {
        assert_eq!(
            format!("{}", CacheKey::Details(MediaKind::Movie, 550)),
            "details:movie:550"
        );
        assert_eq!(
            format!("{}", CacheKey::Credits(MediaKind::Series, 1399)),
            "credits:tv:1399"
        );
        assert_eq!(format!("{}", CacheKey::PersonCredits(287)), "person:287");
        assert_eq!(format!("{}", CacheKey::Season(1399, 2)), "season:1399:2");
    }

    #[test]
    fn test_cache_key_display_search_normalized() {
        let key = CacheKey::Search("  THE Matrix ".to_string());
        assert_eq!(format!("{}", key), "search:the matrix");
    }

    #[test]
    fn test_cache_key_display_discover() {
        let query = DiscoverQuery::by_genres(vec![18, 53])
            .sorted_by(DiscoverSort::Rating)
            .min_votes(100);
        let key = CacheKey::Discover(MediaKind::Movie, query);
        assert_eq!(
            format!("{}", key),
            "discover:movie:with_genres=18,53&sort_by=vote_average.desc&page=1&vote_count.gte=100"
        );
    }

    #[test]
    fn test_cache_key_display_listing() {
        let key = CacheKey::Listing(Listing::Trending(TrendingScope::All), 2);
        assert_eq!(format!("{}", key), "listing:trending:all:2");
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_set_in_background_writes_to_cache() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let conn = create_connection_manager(&redis_url).await.unwrap();
        let (cache, _handle) = Cache::new(conn.clone()).await;

        let key = CacheKey::Search("cache_roundtrip_test".to_string());
        let value = vec!["item1".to_string(), "item2".to_string()];

        cache.set_in_background(&key, &value, 60);
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = conn;
        let _: () = conn.del(format!("{}", key)).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_cache_writer_graceful_shutdown() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let conn = create_connection_manager(&redis_url).await.unwrap();
        let (cache, handle) = Cache::new(conn.clone()).await;

        let key = CacheKey::Genres(MediaKind::Movie);
        let value = vec!["shutdown_test".to_string()];

        cache.set_in_background(&key, &value, 60);
        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = conn;
        let _: () = conn.del(format!("{}", key)).await.unwrap();
    }
}

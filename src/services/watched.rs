//! Per-user "last watched" pointer
//!
//! One record per user. Saves merge into the stored record so a partial update
//! (say, a new `movieId` without a poster) keeps whatever it does not mention.
use std::collections::HashMap;

use redis::{aio::ConnectionManager, AsyncCommands};
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::LastWatched,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchedStore: Send + Sync {
    /// The user's record, `None` when nothing was saved yet
    async fn last_watched(&self, user_id: &str) -> AppResult<Option<LastWatched>>;

    /// Merges `entry` into the stored record and returns the result
    async fn save_last_watched(&self, user_id: &str, entry: LastWatched)
        -> AppResult<LastWatched>;
}

fn validate(entry: &LastWatched) -> AppResult<()> {
    if entry.movie_id.trim().is_empty() {
        return Err(AppError::InvalidInput("movieId is required".to_string()));
    }
    Ok(())
}

/// Process-local store used when no Redis is configured
#[derive(Default)]
pub struct InMemoryWatchedStore {
    entries: RwLock<HashMap<String, LastWatched>>,
}

impl InMemoryWatchedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WatchedStore for InMemoryWatchedStore {
    async fn last_watched(&self, user_id: &str) -> AppResult<Option<LastWatched>> {
        Ok(self.entries.read().await.get(user_id).cloned())
    }

    async fn save_last_watched(
        &self,
        user_id: &str,
        entry: LastWatched,
    ) -> AppResult<LastWatched> {
        validate(&entry)?;

        let mut entries = self.entries.write().await;
        let merged = match entries.remove(user_id) {
            Some(existing) => existing.merge(entry),
            None => entry,
        };
        entries.insert(user_id.to_string(), merged.clone());

        tracing::debug!(user_id = %user_id, movie_id = %merged.movie_id, "Last watched saved");
        Ok(merged)
    }
}

/// Redis-backed store; each record is a hash under `watched:{user_id}` without expiry
///
/// Saving writes only the fields it carries with `HSET`, so the merge happens
/// inside Redis and concurrent saves for one user cannot drop each other's fields.
#[derive(Clone)]
pub struct RedisWatchedStore {
    conn: ConnectionManager,
}

impl RedisWatchedStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

pub fn watched_key(user_id: &str) -> String {
    format!("watched:{}", user_id)
}

const MOVIE_ID_FIELD: &str = "movieId";
const TITLE_FIELD: &str = "title";
const POSTER_PATH_FIELD: &str = "poster_path";

/// Hash fields for the parts of `entry` that are present
fn to_fields(entry: &LastWatched) -> Vec<(&'static str, String)> {
    let mut fields = vec![(MOVIE_ID_FIELD, entry.movie_id.clone())];
    if let Some(title) = &entry.title {
        fields.push((TITLE_FIELD, title.clone()));
    }
    if let Some(poster_path) = &entry.poster_path {
        fields.push((POSTER_PATH_FIELD, poster_path.clone()));
    }
    fields
}

/// Rebuilds a record from its hash; a hash without `movieId` is no record
fn from_fields(mut fields: HashMap<String, String>) -> Option<LastWatched> {
    Some(LastWatched {
        movie_id: fields.remove(MOVIE_ID_FIELD)?,
        title: fields.remove(TITLE_FIELD),
        poster_path: fields.remove(POSTER_PATH_FIELD),
    })
}

#[async_trait::async_trait]
impl WatchedStore for RedisWatchedStore {
    async fn last_watched(&self, user_id: &str) -> AppResult<Option<LastWatched>> {
        let mut conn = self.conn.clone();
        let stored: HashMap<String, String> = conn.hgetall(watched_key(user_id)).await?;
        Ok(from_fields(stored))
    }

    async fn save_last_watched(
        &self,
        user_id: &str,
        entry: LastWatched,
    ) -> AppResult<LastWatched> {
        validate(&entry)?;

        let key = watched_key(user_id);
        let mut conn = self.conn.clone();
        let (stored,): (HashMap<String, String>,) = redis::pipe()
            .atomic()
            .hset_multiple(&key, &to_fields(&entry))
            .ignore()
            .hgetall(&key)
            .query_async(&mut conn)
            .await?;

        let merged = from_fields(stored).ok_or_else(|| {
            AppError::Internal(format!("Last watched record {} vanished after write", key))
        })?;

        tracing::debug!(user_id = %user_id, movie_id = %merged.movie_id, "Last watched saved");
        Ok(merged)
    }
}

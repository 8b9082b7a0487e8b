//! Time-limited local copy of the last fetched bookmark list.
//!
//! Rows are keyed by the linkding base url. Any mutation deletes the row so
//! the next load, from any view, refetches.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;
use rusqlite::{params, OptionalExtension};

use crate::database::connection::Database;
use crate::types::bookmark::Bookmark;
use crate::types::errors::CacheError;

/// How long a cached list is served before a refetch is required.
pub const CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Trait defining bookmark cache operations. Timestamps are UNIX milliseconds.
pub trait BookmarkCacheTrait {
    fn store_at(&self, bookmarks: &[Bookmark], now_ms: i64) -> Result<(), CacheError>;
    fn load_fresh_at(&self, now_ms: i64) -> Result<Option<Vec<Bookmark>>, CacheError>;
    fn cached_at(&self) -> Result<Option<i64>, CacheError>;
    fn invalidate(&self) -> Result<(), CacheError>;
}

/// Bookmark cache backed by the `bookmark_cache` table.
pub struct BookmarkCache {
    db: Arc<Database>,
    base_url: String,
    ttl: Duration,
}

impl BookmarkCache {
    pub fn new(db: Arc<Database>, base_url: &str) -> Self {
        Self {
            db,
            base_url: base_url.to_string(),
            ttl: CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current UNIX time in milliseconds.
    pub fn now_ms() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// `true` while an entry written at `cached_at` may still be served at `now_ms`.
    pub fn is_fresh(&self, cached_at: i64, now_ms: i64) -> bool {
        now_ms - cached_at < self.ttl.as_millis() as i64
    }

    pub fn store(&self, bookmarks: &[Bookmark]) -> Result<(), CacheError> {
        self.store_at(bookmarks, Self::now_ms())
    }

    pub fn load_fresh(&self) -> Result<Option<Vec<Bookmark>>, CacheError> {
        self.load_fresh_at(Self::now_ms())
    }
}

impl BookmarkCacheTrait for BookmarkCache {
    fn store_at(&self, bookmarks: &[Bookmark], now_ms: i64) -> Result<(), CacheError> {
        let payload = serde_json::to_string(bookmarks)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;
        self.db
            .connection()
            .execute(
                "INSERT OR REPLACE INTO bookmark_cache (base_url, payload, cached_at) VALUES (?1, ?2, ?3)",
                params![self.base_url, payload, now_ms],
            )
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        debug!("cached {} bookmarks for {}", bookmarks.len(), self.base_url);
        Ok(())
    }

    /// Returns the cached list if one exists and has not expired.
    fn load_fresh_at(&self, now_ms: i64) -> Result<Option<Vec<Bookmark>>, CacheError> {
        let row: Option<(String, i64)> = self
            .db
            .connection()
            .query_row(
                "SELECT payload, cached_at FROM bookmark_cache WHERE base_url = ?1",
                params![self.base_url],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        match row {
            Some((payload, cached_at)) if self.is_fresh(cached_at, now_ms) => {
                let bookmarks = serde_json::from_str(&payload)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                Ok(Some(bookmarks))
            }
            Some(_) => {
                debug!("cache for {} expired", self.base_url);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn cached_at(&self) -> Result<Option<i64>, CacheError> {
        self.db
            .connection()
            .query_row(
                "SELECT cached_at FROM bookmark_cache WHERE base_url = ?1",
                params![self.base_url],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| CacheError::DatabaseError(e.to_string()))
    }

    fn invalidate(&self) -> Result<(), CacheError> {
        self.db
            .connection()
            .execute(
                "DELETE FROM bookmark_cache WHERE base_url = ?1",
                params![self.base_url],
            )
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

use std::{path::Path, str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::error::CacheError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS songs (
    song_id   TEXT PRIMARY KEY NOT NULL,
    song_link TEXT NOT NULL
);
"#;

/// Point lookup and upsert of track id → link.
///
/// `get` returns `Ok(None)` on a miss; only storage failures are errors.
/// Implementations must be safe to share between workers.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Looks up the cached link of a track.
    ///
    /// # Arguments
    ///
    /// * `key` - Spotify track id
    ///
    /// # Returns
    ///
    /// `Ok(Some(link))` on a hit, `Ok(None)` on a miss. `Err` only when the
    /// storage itself could not be read.
    ///
    /// # Example
    ///
    /// ```
    /// match cache.get("4uLU6hMCjMI75M1A2tKUQC").await? {
    ///     Some(link) => println!("{}", link),
    ///     None => println!("not cached yet"),
    /// }
    /// ```
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Inserts or replaces the link of a track.
    ///
    /// # Arguments
    ///
    /// * `key` - Spotify track id
    /// * `value` - Watch link; callers never pass an empty link
    ///
    /// Concurrent calls for the same key end with one of the written values,
    /// never a mix or a partial entry.
    async fn put(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Durable link cache backed by SQLite.
///
/// The pool is shared by every worker; SQLite serialises writers itself and
/// each `put` is a single upsert statement, so concurrent writes to the same
/// key end with the last writer's value and never leave a partial row.
#[derive(Clone)]
pub struct LinkCache {
    pool: SqlitePool,
}

impl LinkCache {
    /// Opens (creating if needed) the cache database at `path`.
    ///
    /// Missing parent directories are created and the schema is applied, so a
    /// fresh path yields an empty, usable cache.
    ///
    /// # Arguments
    ///
    /// * `path` - Database file, usually [`crate::config::database_path`]
    /// * `max_connections` - Pool size; match it to the worker count
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, CacheError> {
        let location = path.display().to_string();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::Open {
                    path: location.clone(),
                    source: sqlx::Error::Io(e),
                })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|source| CacheError::Open {
                path: location.clone(),
                source,
            })?;

        Self::init(pool, location).await
    }

    /// Opens a private in-memory cache for `--no-cache` runs. The single
    /// connection keeps the database alive for the lifetime of the pool.
    pub async fn in_memory() -> Result<Self, CacheError> {
        let location = "sqlite::memory:".to_string();
        let options =
            SqliteConnectOptions::from_str(&location).map_err(|source| CacheError::Open {
                path: location.clone(),
                source,
            })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|source| CacheError::Open {
                path: location.clone(),
                source,
            })?;

        Self::init(pool, location).await
    }

    async fn init(pool: SqlitePool, location: String) -> Result<Self, CacheError> {
        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|source| CacheError::Open {
                path: location,
                source,
            })?;
        Ok(Self { pool })
    }

    pub async fn count(&self) -> Result<i64, CacheError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM songs")
            .fetch_one(&self.pool)
            .await
            .map_err(|source| CacheError::Read {
                key: "*".to_string(),
                source,
            })?;
        Ok(count)
    }

    /// All entries ordered by track id.
    pub async fn entries(&self) -> Result<Vec<(String, String)>, CacheError> {
        sqlx::query_as("SELECT song_id, song_link FROM songs ORDER BY song_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|source| CacheError::Read {
                key: "*".to_string(),
                source,
            })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl LinkStore for LinkCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT song_link FROM songs WHERE song_id = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|source| CacheError::Read {
                key: key.to_string(),
                source,
            })?;
        Ok(row.map(|(link,)| link))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        sqlx::query(
            "INSERT INTO songs (song_id, song_link) VALUES (?, ?)
             ON CONFLICT(song_id) DO UPDATE SET song_link = excluded.song_link",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|source| CacheError::Write {
            key: key.to_string(),
            source,
        })?;
        Ok(())
    }
}

//! Database connection management.
//!
//! Provides a thin pool wrapper around `SQLx` configured for the crawler's
//! single-writer access pattern.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Connection pool for the crawler's sqlite database.
///
/// WAL journaling keeps the background autosave reader from ever observing a
/// partially written row while the main loop writes.
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: Pool<Sqlite>,
}

impl DbPool {
    /// Create a new connection pool.
    ///
    /// # Arguments
    /// * `path` - Path to the sqlite database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened or created.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
        })?;

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .journal_mode(SqliteJournalMode::Wal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

        tracing::info!("Database pool created at {}", path_str);

        Ok(Self { pool })
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pool_creation() {
        let pool = DbPool::new(":memory:").await.expect("create pool");
        sqlx::query("SELECT 1")
            .execute(pool.pool())
            .await
            .expect("execute probe query");
    }

    #[tokio::test]
    async fn test_pool_close() {
        let pool = DbPool::new(":memory:").await.expect("create pool");
        pool.close().await; // Should not panic
    }

    #[tokio::test]
    async fn test_pool_creates_missing_file() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("crawl.db");
        let pool = DbPool::new(&path).await.expect("create pool");
        assert!(path.exists());
        pool.close().await;
    }
}

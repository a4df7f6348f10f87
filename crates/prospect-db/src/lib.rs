//! Prospect Database Layer
//!
//! Provides sqlite persistence for the crawler via `SQLx` with embedded
//! migrations. Three concerns live here, all backed by one durable
//! key-value table:
//!
//! - [`kv`] - the raw `get`/`put`/`exists` store
//! - [`exclusion`] - the monotonically growing set of already-emitted company ids
//! - [`progress`] - the resumable crawl checkpoint
//!
//! # Design Principles
//!
//! - Single writer (the main crawl loop); the autosave timer only flushes
//! - Every persisted value is a whole-record JSON overwrite, so a concurrent
//!   read never observes a partial update
//! - Migrations run automatically at startup via `sqlx::migrate!`
//!
//! # Example
//!
//! ```ignore
//! use prospect_db::Database;
//!
//! let db = Database::new("prospect.db").await?;
//! db.run_migrations().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod exclusion;
pub mod kv;
pub mod migrations;
pub mod progress;

// Re-export commonly used types
pub use connection::DbPool;
pub use error::{DatabaseError, Result};
pub use exclusion::ExclusionStore;
pub use progress::{CheckpointStore, JobProgress};

use std::path::Path;

/// High-level database interface with migrations.
///
/// Convenient wrapper around [`DbPool`] that handles initialization and
/// migration in one place.
#[derive(Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the database at the specified path.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = DbPool::new(path).await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    ///
    /// Call after creating a new instance to ensure the schema is current.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

//! Job-progress checkpointing.
//!
//! The persisted `JobProgress` record is the crawl's resume pointer. It is
//! written before each combination and on an autosave timer, and always
//! reflects a position from which replaying work is safe (replay is made
//! idempotent by the exclusion set, not by the checkpoint).

use crate::error::{DatabaseError, Result};
use crate::kv;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Key the serialized progress record lives under.
const PROGRESS_KEY: &str = "progress/crawl";

/// Persistent crawl-progress record.
///
/// `combination_index` is monotonically non-decreasing within a run; `page`
/// resets to 1 whenever the index advances. Interruption is not a distinct
/// state: a process that died mid-run simply left `completed = false`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobProgress {
    /// Index of the combination currently being processed
    pub combination_index: usize,
    /// Page within the current combination (1-based)
    pub page: u32,
    /// Companies emitted so far, across the whole job
    pub processed_company_count: u64,
    /// Contacts emitted so far, across the whole job
    pub processed_contact_count: u64,
    /// When the job first started
    pub started_at: Option<DateTime<Utc>>,
    /// When this record was last flushed
    pub last_checkpoint_at: Option<DateTime<Utc>>,
    /// Terminal flag; a completed job is never reprocessed
    pub completed: bool,
    /// When the job reached the terminal state
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobProgress {
    /// A fresh record for a job that is just starting.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            combination_index: 0,
            page: 1,
            processed_company_count: 0,
            processed_contact_count: 0,
            started_at: Some(Utc::now()),
            last_checkpoint_at: None,
            completed: false,
            completed_at: None,
        }
    }

    /// Advance to a combination, resetting the page pointer.
    pub fn advance_to(&mut self, combination_index: usize) {
        self.combination_index = combination_index;
        self.page = 1;
    }

    /// Mark the job terminally complete.
    pub fn mark_completed(&mut self) {
        self.completed = true;
        self.completed_at = Some(Utc::now());
    }
}

/// Durable store for the single `JobProgress` record.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    pool: SqlitePool,
}

impl CheckpointStore {
    /// Create a store over the given pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Load the persisted progress record.
    ///
    /// A missing record initializes a fresh one with `started_at = now`.
    ///
    /// # Errors
    /// Fails loudly on corrupt (unparsable) persisted data: resuming from a
    /// garbled checkpoint could silently redo or skip large spans of work.
    pub async fn load(&self) -> Result<JobProgress> {
        match kv::get(&self.pool, PROGRESS_KEY).await? {
            Some(value) => {
                let progress: JobProgress = serde_json::from_value(value)
                    .map_err(|e| DatabaseError::Decode(format!("corrupt job progress: {e}")))?;
                tracing::info!(
                    combination_index = progress.combination_index,
                    page = progress.page,
                    completed = progress.completed,
                    "resumed job progress"
                );
                Ok(progress)
            }
            None => {
                tracing::info!("no job progress found, starting fresh");
                Ok(JobProgress::fresh())
            }
        }
    }

    /// Persist the progress record, stamping `last_checkpoint_at`.
    ///
    /// # Errors
    /// A write failure propagates and aborts the current unit of work;
    /// silently losing a checkpoint risks duplicate processing.
    pub async fn save(&self, progress: &mut JobProgress) -> Result<()> {
        progress.last_checkpoint_at = Some(Utc::now());
        let value = serde_json::to_value(&*progress)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        kv::put(&self.pool, PROGRESS_KEY, &value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn create_test_db() -> Database {
        let db = Database::new(":memory:").await.expect("create test database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    #[tokio::test]
    async fn test_load_fresh() {
        let db = create_test_db().await;
        let store = CheckpointStore::new(db.pool().clone());

        let progress = store.load().await.expect("load progress");
        assert_eq!(progress.combination_index, 0);
        assert_eq!(progress.page, 1);
        assert!(!progress.completed);
        assert!(progress.started_at.is_some());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let db = create_test_db().await;
        let store = CheckpointStore::new(db.pool().clone());

        let mut progress = JobProgress::fresh();
        progress.advance_to(5);
        progress.processed_company_count = 42;
        store.save(&mut progress).await.expect("save progress");
        assert!(progress.last_checkpoint_at.is_some());

        let reloaded = store.load().await.expect("reload progress");
        assert_eq!(reloaded.combination_index, 5);
        assert_eq!(reloaded.page, 1);
        assert_eq!(reloaded.processed_company_count, 42);
    }

    #[tokio::test]
    async fn test_advance_resets_page() {
        let mut progress = JobProgress::fresh();
        progress.page = 7;
        progress.advance_to(3);
        assert_eq!(progress.combination_index, 3);
        assert_eq!(progress.page, 1);
    }

    #[tokio::test]
    async fn test_mark_completed() {
        let db = create_test_db().await;
        let store = CheckpointStore::new(db.pool().clone());

        let mut progress = JobProgress::fresh();
        progress.mark_completed();
        store.save(&mut progress).await.expect("save progress");

        let reloaded = store.load().await.expect("reload progress");
        assert!(reloaded.completed);
        assert!(reloaded.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_progress_fails_loudly() {
        let db = create_test_db().await;
        let store = CheckpointStore::new(db.pool().clone());

        kv::put(db.pool(), PROGRESS_KEY, &serde_json::json!("not a record"))
            .await
            .expect("write corrupt value");

        let result = store.load().await;
        assert!(matches!(result, Err(DatabaseError::Decode(_))));
    }
}

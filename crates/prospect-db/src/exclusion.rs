//! Persistent exclusion set of already-processed company identifiers.
//!
//! The set grows monotonically for the lifetime of the process and across
//! restarts. It is the idempotency mechanism that makes checkpoint replay
//! safe: a company emitted before a crash is excluded after restart.

use crate::error::Result;
use crate::kv;
use sqlx::SqlitePool;
use std::collections::HashSet;

/// Key the serialized identifier list lives under.
const EXCLUSION_KEY: &str = "exclusions/companies";

/// Durable set of company identifiers that have already been emitted.
///
/// Single-writer: only the main crawl loop mutates it. `add_all` persists the
/// full set synchronously before returning, so the in-memory and durable
/// forms never diverge past one call.
#[derive(Debug)]
pub struct ExclusionStore {
    pool: SqlitePool,
    ids: HashSet<String>,
}

impl ExclusionStore {
    /// Load the exclusion set from durable storage.
    ///
    /// A missing or corrupt stored value degrades to an empty set with a
    /// warning; under-deduplication is preferred over blocking the run.
    pub async fn load(pool: SqlitePool) -> Self {
        let ids = match kv::get(&pool, EXCLUSION_KEY).await {
            Ok(Some(value)) => match serde_json::from_value::<Vec<String>>(value) {
                Ok(list) => {
                    tracing::info!(count = list.len(), "loaded exclusion set");
                    list.into_iter().collect()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt exclusion set, starting empty");
                    HashSet::new()
                }
            },
            Ok(None) => {
                tracing::info!("no exclusion set found, starting empty");
                HashSet::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read exclusion set, starting empty");
                HashSet::new()
            }
        };

        Self { pool, ids }
    }

    /// Whether an identifier has already been processed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of excluded identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Add identifiers to the set and persist the full set before returning.
    ///
    /// Adding an already-present identifier is a no-op on membership.
    /// Returns the number of identifiers that were actually new.
    ///
    /// # Errors
    /// A persistence failure propagates: silently losing exclusions would
    /// risk duplicate emission on the next restart.
    pub async fn add_all<I>(&mut self, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let mut added = 0;
        for id in ids {
            if self.ids.insert(id) {
                added += 1;
            }
        }

        if added > 0 {
            self.persist().await?;
        }

        Ok(added)
    }

    /// Flush the full set to durable storage.
    async fn persist(&self) -> Result<()> {
        let mut list: Vec<&String> = self.ids.iter().collect();
        list.sort();
        let value = serde_json::to_value(&list)
            .map_err(|e| crate::error::DatabaseError::Serialization(e.to_string()))?;
        kv::put(&self.pool, EXCLUSION_KEY, &value).await
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
    async fn test_load_empty() {
        let db = create_test_db().await;
        let store = ExclusionStore::load(db.pool().clone()).await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_add_all_and_contains() {
        let db = create_test_db().await;
        let mut store = ExclusionStore::load(db.pool().clone()).await;

        let added = store
            .add_all(vec!["co-1".to_string(), "co-2".to_string()])
            .await
            .expect("add ids");
        assert_eq!(added, 2);
        assert!(store.contains("co-1"));
        assert!(store.contains("co-2"));
        assert!(!store.contains("co-3"));
    }

    #[tokio::test]
    async fn test_add_all_idempotent() {
        let db = create_test_db().await;
        let mut store = ExclusionStore::load(db.pool().clone()).await;

        store
            .add_all(vec!["co-1".to_string()])
            .await
            .expect("first add");
        let added = store
            .add_all(vec!["co-1".to_string()])
            .await
            .expect("second add");
        assert_eq!(added, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_survives_reload() {
        let db = create_test_db().await;
        {
            let mut store = ExclusionStore::load(db.pool().clone()).await;
            store
                .add_all(vec!["co-1".to_string(), "co-2".to_string()])
                .await
                .expect("add ids");
        }

        let reloaded = ExclusionStore::load(db.pool().clone()).await;
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("co-1"));
    }

    #[tokio::test]
    async fn test_corrupt_value_degrades_to_empty() {
        let db = create_test_db().await;
        // Stored value is valid JSON but not a string list
        kv::put(db.pool(), EXCLUSION_KEY, &serde_json::json!({"oops": 1}))
            .await
            .expect("write corrupt value");

        let store = ExclusionStore::load(db.pool().clone()).await;
        assert!(store.is_empty());
    }
}

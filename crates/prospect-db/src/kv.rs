//! Durable key-value storage.
//!
//! Provides the `get`/`put`/`exists` contract the crawler's stores are built
//! on. Values are stored as JSON text and replaced wholesale on update, so a
//! concurrent reader sees either the old record or the new one, never a mix.

use crate::error::{DatabaseError, Result};
use serde_json::Value;
use sqlx::SqlitePool;

/// Store a value under a key, replacing any previous value.
pub async fn put(pool: &SqlitePool, key: &str, value: &Value) -> Result<()> {
    let value_str = serde_json::to_string(value)
        .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

    sqlx::query(
        r"
        INSERT INTO kv (key, value, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        ",
    )
    .bind(key)
    .bind(value_str)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetch the value stored under a key, if any.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<Value>> {
    let row: Option<(String,)> = sqlx::query_as(
        r"
        SELECT value
        FROM kv
        WHERE key = ?
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((value_str,)) => {
            let value: Value = serde_json::from_str(&value_str)
                .map_err(|e| DatabaseError::Decode(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Whether a key is present.
pub async fn exists(pool: &SqlitePool, key: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Remove a key and its value.
pub async fn delete(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM kv WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
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
    async fn test_put_and_get() {
        let db = create_test_db().await;
        let pool = db.pool();

        let value = serde_json::json!({"page": 3, "combination_index": 12});
        put(pool, "progress/crawl", &value).await.expect("put value");

        let retrieved = get(pool, "progress/crawl").await.expect("get value");
        assert_eq!(retrieved, Some(value));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = create_test_db().await;
        let pool = db.pool();

        put(pool, "k", &serde_json::json!(1)).await.expect("first put");
        put(pool, "k", &serde_json::json!(2)).await.expect("second put");

        let retrieved = get(pool, "k").await.expect("get value");
        assert_eq!(retrieved, Some(serde_json::json!(2)));
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let db = create_test_db().await;
        let result = get(db.pool(), "does_not_exist").await.expect("get value");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_exists() {
        let db = create_test_db().await;
        let pool = db.pool();

        assert!(!exists(pool, "k").await.expect("check missing"));
        put(pool, "k", &serde_json::json!([])).await.expect("put value");
        assert!(exists(pool, "k").await.expect("check present"));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = create_test_db().await;
        let pool = db.pool();

        put(pool, "k", &serde_json::json!(true)).await.expect("put value");
        delete(pool, "k").await.expect("delete key");
        assert!(!exists(pool, "k").await.expect("check deleted"));
    }
}

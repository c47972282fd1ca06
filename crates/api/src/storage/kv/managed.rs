//! Managed key-value store on a `kv_entries` table.

use sqlx::SqlitePool;

use super::{KvError, KvStore, PutOutcome, validate_key};

/// Key-value entries in their own SQLite database.
#[derive(Debug, Clone)]
pub struct SqlKvStore {
    pool: SqlitePool,
}

impl SqlKvStore {
    /// Wrap a pool whose database has the `kv` migrations applied.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(super) async fn ping(&self) -> Result<(), KvError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

impl KvStore for SqlKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        validate_key(key)?;

        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<PutOutcome, KvError> {
        validate_key(key)?;

        sqlx::query(
            r"
            INSERT INTO kv_entries (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(PutOutcome::Persisted)
    }
}

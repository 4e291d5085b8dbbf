use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use trail_types::{RecordDraft, TransformationRecord};

use crate::error::{StoreError, StoreResult};
use crate::traits::LedgerStore;

/// Durable, SQLite-backed ledger store.
///
/// One table of records keyed by an auto-assigned rowid, with lookup indexes
/// on `dataset_id` and `timestamp`. Timestamps are stored as RFC 3339 text
/// and `metadata` as serialized JSON text, so rows stay readable with plain
/// `sqlite3` tooling.
pub struct SqliteLedgerStore {
    pool: SqlitePool,
}

impl SqliteLedgerStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        tracing::info!(path = %path.as_ref().display(), "opened ledger database");
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database. Used by tests and demos.
    ///
    /// The pool is pinned to a single long-lived connection: an in-memory
    /// SQLite database lives and dies with its connection.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Close the connection pool. Called by the composition root at
    /// shutdown; further operations fail with [`StoreError::Unavailable`].
    ///
    /// [`StoreError::Unavailable`]: crate::error::StoreError::Unavailable
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transformation_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dataset_id TEXT NOT NULL,
                operation TEXT NOT NULL,
                source_dataset_id TEXT,
                metadata TEXT,
                timestamp TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_records_dataset_id \
             ON transformation_records(dataset_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_records_timestamp \
             ON transformation_records(timestamp)",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn append(&self, draft: RecordDraft) -> StoreResult<TransformationRecord> {
        draft.validate()?;
        let now = Utc::now();
        let timestamp = draft.timestamp.unwrap_or(now);
        let metadata_json = draft
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO transformation_records
                (dataset_id, operation, source_dataset_id, metadata, timestamp, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&draft.dataset_id)
        .bind(&draft.operation)
        .bind(&draft.source_dataset_id)
        .bind(&metadata_json)
        .bind(timestamp.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, dataset_id = %draft.dataset_id, "recorded transformation");
        Ok(draft.into_record(id, now))
    }

    async fn find_by_dataset(&self, dataset_id: &str) -> StoreResult<Vec<TransformationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, dataset_id, operation, source_dataset_id, metadata, timestamp, created_at
            FROM transformation_records
            WHERE dataset_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(dataset_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn list_dataset_ids(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT DISTINCT dataset_id FROM transformation_records ORDER BY dataset_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("dataset_id").map_err(StoreError::from))
            .collect()
    }
}

fn record_from_row(row: &SqliteRow) -> StoreResult<TransformationRecord> {
    let id: i64 = row.try_get("id")?;
    let metadata = row
        .try_get::<Option<String>, _>("metadata")?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(|e| StoreError::Corrupt {
            id,
            reason: format!("undecodable metadata: {e}"),
        })?;
    Ok(TransformationRecord {
        id,
        dataset_id: row.try_get("dataset_id")?,
        operation: row.try_get("operation")?,
        source_dataset_id: row.try_get("source_dataset_id")?,
        metadata,
        timestamp: parse_timestamp(row, id, "timestamp")?,
        created_at: parse_timestamp(row, id, "created_at")?,
    })
}

fn parse_timestamp(row: &SqliteRow, id: i64, column: &str) -> StoreResult<DateTime<Utc>> {
    let raw: String = row.try_get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            id,
            reason: format!("undecodable {column} {raw:?}: {e}"),
        })
}

impl std::fmt::Debug for SqliteLedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteLedgerStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use trail_types::RecordError;

    fn draft(dataset_id: &str, operation: &str) -> RecordDraft {
        RecordDraft::new(dataset_id, operation).unwrap()
    }

    // -----------------------------------------------------------------------
    // Append / read roundtrip
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn append_and_find_roundtrip() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        let written = store
            .append(
                draft("clean", "dedupe")
                    .with_source("raw")
                    .with_metadata(json!({"dropped": 3, "stages": ["a", "b"]})),
            )
            .await
            .unwrap();

        let records = store.find_by_dataset("clean").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], written);
    }

    #[tokio::test]
    async fn ids_strictly_increase_across_datasets() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        let mut previous = 0;
        for (dataset, operation) in [("raw", "load"), ("clean", "dedupe"), ("raw", "reload")] {
            let record = store.append(draft(dataset, operation)).await.unwrap();
            assert!(record.id > previous);
            previous = record.id;
        }
    }

    #[tokio::test]
    async fn explicit_timestamp_is_preserved() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        let logical = Utc.with_ymd_and_hms(2023, 3, 14, 1, 59, 26).unwrap();
        store
            .append(draft("raw", "load").with_timestamp(logical))
            .await
            .unwrap();

        let records = store.find_by_dataset("raw").await.unwrap();
        assert_eq!(records[0].timestamp, logical);
        assert_ne!(records[0].created_at, logical);
    }

    #[tokio::test]
    async fn scalar_metadata_survives_storage() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        for (i, metadata) in [json!(42), json!("text"), json!([1, 2]), json!(null)]
            .into_iter()
            .enumerate()
        {
            let dataset = format!("d{i}");
            store
                .append(draft(&dataset, "op").with_metadata(metadata.clone()))
                .await
                .unwrap();
            let records = store.find_by_dataset(&dataset).await.unwrap();
            assert_eq!(records[0].metadata, Some(metadata));
        }
    }

    #[tokio::test]
    async fn missing_metadata_reads_back_as_none() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        store.append(draft("raw", "load")).await.unwrap();
        let records = store.find_by_dataset("raw").await.unwrap();
        assert!(records[0].metadata.is_none());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn rejected_append_leaves_store_unchanged() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        let bad = RecordDraft {
            dataset_id: "raw".into(),
            operation: "  ".into(),
            source_dataset_id: None,
            metadata: None,
            timestamp: None,
        };
        let err = store.append(bad).await.unwrap_err();
        match err {
            StoreError::Validation(RecordError::EmptyField(field)) => {
                assert_eq!(field, "operation");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.list_dataset_ids().await.unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn find_returns_write_order_not_timestamp_order() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        let early = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        // Written late-first: write order must win over timestamp order.
        store
            .append(draft("d", "second-logically").with_timestamp(late))
            .await
            .unwrap();
        store
            .append(draft("d", "first-logically").with_timestamp(early))
            .await
            .unwrap();

        let records = store.find_by_dataset("d").await.unwrap();
        let operations: Vec<&str> = records.iter().map(|r| r.operation.as_str()).collect();
        assert_eq!(operations, ["second-logically", "first-logically"]);
    }

    #[tokio::test]
    async fn unknown_dataset_is_empty_not_error() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        assert!(store.find_by_dataset("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dangling_source_is_stored_verbatim() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        store
            .append(draft("derived", "import").with_source("never-recorded"))
            .await
            .unwrap();
        let records = store.find_by_dataset("derived").await.unwrap();
        assert_eq!(records[0].source_dataset_id.as_deref(), Some("never-recorded"));
    }

    #[tokio::test]
    async fn list_dataset_ids_is_distinct_and_sorted() {
        let store = SqliteLedgerStore::open_in_memory().await.unwrap();
        for (dataset, operation) in [("raw", "load"), ("clean", "dedupe"), ("raw", "reload")] {
            store.append(draft(dataset, operation)).await.unwrap();
        }
        assert_eq!(store.list_dataset_ids().await.unwrap(), ["clean", "raw"]);
    }

    // -----------------------------------------------------------------------
    // Durability
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail.db");

        let store = SqliteLedgerStore::open(&path).await.unwrap();
        store
            .append(draft("raw", "load").with_metadata(json!({"rows": 100})))
            .await
            .unwrap();
        store.close().await;

        let reopened = SqliteLedgerStore::open(&path).await.unwrap();
        let records = reopened.find_by_dataset("raw").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metadata, Some(json!({"rows": 100})));
    }

    #[tokio::test]
    async fn ids_continue_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail.db");

        let store = SqliteLedgerStore::open(&path).await.unwrap();
        let first = store.append(draft("raw", "load")).await.unwrap();
        store.close().await;

        let reopened = SqliteLedgerStore::open(&path).await.unwrap();
        let second = reopened.append(draft("raw", "reload")).await.unwrap();
        assert!(second.id > first.id);
    }
}

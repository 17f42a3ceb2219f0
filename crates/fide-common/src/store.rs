//! Dataset store backed by an embedded SQLite database
//!
//! The table always holds exactly one ingested snapshot. A sync replaces the
//! whole snapshot inside a single transaction; a failed load rolls back and
//! leaves the previous snapshot untouched.

use crate::error::{FideError, Result};
use crate::types::{Field, FieldValue, PlayerRecord, ProjectedRow};
use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

// ============================================================================
// Storage Configuration
// ============================================================================

/// Name of the dataset table
pub const TABLE_NAME: &str = "fide_ratings";

/// Rows per multi-row INSERT (12 columns x 500 rows stays under SQLite's
/// bound-parameter limit)
pub const INSERT_BATCH_SIZE: usize = 500;

/// Keys per `IN (...)` lookup
pub const LOOKUP_CHUNK_SIZE: usize = 500;

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS fide_ratings (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        country TEXT NOT NULL,
        sex TEXT NOT NULL,
        title TEXT,
        rating INTEGER NOT NULL,
        games_played INTEGER NOT NULL,
        rapid_rating INTEGER NOT NULL,
        rapid_games INTEGER NOT NULL,
        blitz_rating INTEGER NOT NULL,
        blitz_games INTEGER NOT NULL,
        birthday TEXT
    )
"#;

const INSERT_PREFIX_SQL: &str = r#"
    INSERT INTO fide_ratings (
        id, name, country, sex, title, rating, games_played,
        rapid_rating, rapid_games, blitz_rating, blitz_games, birthday
    )
"#;

/// Keyed, field-projected lookup
///
/// The query engine depends on this trait rather than on [`DatasetStore`]
/// directly, so lookups can be observed in tests.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Return the rows whose id is in `ids`, projected onto `fields`
    ///
    /// Unmatched ids are silently absent. Row order is whatever the engine
    /// returns.
    async fn query_by_ids(&self, ids: &[String], fields: &[Field]) -> Result<Vec<ProjectedRow>>;
}

/// SQLite dataset store
pub struct DatasetStore {
    pool: SqlitePool,
}

impl DatasetStore {
    /// Open the store, creating the database file if it does not exist
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(path.as_ref(), true).await
    }

    /// Open an existing store; a missing database file is an error
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(path.as_ref(), false).await
    }

    async fn connect(path: &Path, create_if_missing: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create_if_missing)
            .synchronous(SqliteSynchronous::Normal);

        // Single connection: both pipelines are strictly sequential
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|source| FideError::Database {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), "Opened dataset store");
        Ok(Self { pool })
    }

    /// Create the dataset table if absent. Safe to call on every run.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(FideError::Schema)?;

        debug!(table = TABLE_NAME, "Schema ensured");
        Ok(())
    }

    /// Atomically replace the whole snapshot with `records`
    ///
    /// Deletes every row and inserts the new set in one transaction. Any
    /// failure (including a duplicate id) rolls the transaction back so the
    /// previous snapshot stays visible. An empty record set is rejected
    /// before the transaction starts.
    pub async fn replace_all(&self, records: &[PlayerRecord]) -> Result<u64> {
        if records.is_empty() {
            warn!("Empty snapshot offered for load, keeping current dataset");
            return Err(FideError::EmptySnapshot);
        }

        let mut tx = self.pool.begin().await.map_err(FideError::TransactionFailure)?;

        let deleted = sqlx::query("DELETE FROM fide_ratings")
            .execute(&mut *tx)
            .await
            .map_err(FideError::TransactionFailure)?
            .rows_affected();
        debug!(deleted, "Cleared previous snapshot inside transaction");

        let mut inserted = 0u64;
        for batch in records.chunks(INSERT_BATCH_SIZE) {
            let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(INSERT_PREFIX_SQL);

            query_builder.push_values(batch, |mut b, record| {
                b.push_bind(record.id.as_str())
                    .push_bind(record.name.as_str())
                    .push_bind(record.country.as_str())
                    .push_bind(record.sex.as_str())
                    .push_bind(record.title.as_deref())
                    .push_bind(record.rating)
                    .push_bind(record.games_played)
                    .push_bind(record.rapid_rating)
                    .push_bind(record.rapid_games)
                    .push_bind(record.blitz_rating)
                    .push_bind(record.blitz_games)
                    .push_bind(record.birthday.as_deref());
            });

            let result = query_builder.build().execute(&mut *tx).await;
            match result {
                Ok(result) => inserted += result.rows_affected(),
                Err(e) => {
                    warn!(error = %e, inserted, "Insert failed, rolling back");
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(error = %rollback_err, "Explicit rollback failed");
                    }
                    return Err(FideError::TransactionFailure(e));
                },
            }
        }

        tx.commit().await.map_err(FideError::TransactionFailure)?;

        info!(records = inserted, "Dataset snapshot replaced");
        Ok(inserted)
    }

    /// Number of rows in the current snapshot
    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM fide_ratings")
            .fetch_one(&self.pool)
            .await
            .map_err(FideError::Query)?;

        row.try_get("count").map_err(FideError::Query)
    }

    /// Keyed lookup, see [`RecordLookup::query_by_ids`]
    pub async fn query_by_ids(
        &self,
        ids: &[String],
        fields: &[Field],
    ) -> Result<Vec<ProjectedRow>> {
        if fields.is_empty() {
            return Err(FideError::EmptyProjection);
        }

        // A repeated key must not yield a repeated row across chunks
        let mut seen = HashSet::new();
        let unique_ids: Vec<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();

        if unique_ids.is_empty() {
            return Ok(Vec::new());
        }

        // Column names come only from the closed Field enum
        let columns = fields
            .iter()
            .map(|field| field.column())
            .collect::<Vec<_>>()
            .join(", ");

        let mut rows = Vec::new();
        for chunk in unique_ids.chunks(LOOKUP_CHUNK_SIZE) {
            let mut query_builder: QueryBuilder<Sqlite> =
                QueryBuilder::new(format!("SELECT {} FROM {} WHERE id IN (", columns, TABLE_NAME));

            let mut separated = query_builder.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");

            let fetched = query_builder
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(FideError::Query)?;

            for row in &fetched {
                rows.push(decode_row(row, fields)?);
            }
        }

        debug!(requested = unique_ids.len(), matched = rows.len(), "Lookup complete");
        Ok(rows)
    }

    /// Close the underlying pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordLookup for DatasetStore {
    async fn query_by_ids(&self, ids: &[String], fields: &[Field]) -> Result<Vec<ProjectedRow>> {
        DatasetStore::query_by_ids(self, ids, fields).await
    }
}

/// Decode one result row according to the requested field types
fn decode_row(row: &SqliteRow, fields: &[Field]) -> Result<ProjectedRow> {
    fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let value = if field.is_integer() {
                row.try_get::<Option<i64>, _>(idx)
                    .map_err(FideError::Query)?
                    .map_or(FieldValue::Null, FieldValue::Integer)
            } else {
                FieldValue::from(row.try_get::<Option<String>, _>(idx).map_err(FideError::Query)?)
            };
            Ok(value)
        })
        .collect()
}

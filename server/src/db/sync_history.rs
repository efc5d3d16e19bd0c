//! The sync audit log.
//!
//! Every sync run opens exactly one history row in `running` state and
//! terminally updates it to `success` or `error`. There are no other
//! states and no row is ever opened without being closed by the same run.

use serde::Serialize;
use sqlx::Row;

use super::{now_utc, Db};

/// The five upstream sources, with their seeded row ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    ScWiki,
    Fleetyards,
    HangarXplor,
    Scunpacked,
    RsiApi,
}

impl SyncSource {
    pub fn id(&self) -> i64 {
        match self {
            SyncSource::ScWiki => 1,
            SyncSource::Fleetyards => 2,
            SyncSource::HangarXplor => 3,
            SyncSource::Scunpacked => 4,
            SyncSource::RsiApi => 5,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SyncSource::ScWiki => "scwiki",
            SyncSource::Fleetyards => "fleetyards",
            SyncSource::HangarXplor => "hangarxplor",
            SyncSource::Scunpacked => "scunpacked",
            SyncSource::RsiApi => "rsi_api",
        }
    }
}

/// Run state recorded in the audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Running,
    Success,
    Error,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Running => "running",
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        }
    }
}

/// A stored sync_history row.
#[derive(Debug, Clone, Serialize)]
pub struct SyncHistoryRow {
    pub id: i64,
    pub source_id: i64,
    pub source_key: String,
    pub endpoint: String,
    pub status: String,
    pub record_count: i64,
    pub error_message: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::any::AnyRow> for SyncHistoryRow {
    fn from_row(row: &'r sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
        Ok(SyncHistoryRow {
            id: row.try_get("id")?,
            source_id: row.try_get("source_id")?,
            source_key: row.try_get("source_key")?,
            endpoint: row.try_get("endpoint")?,
            status: row.try_get("status")?,
            record_count: row.try_get("record_count")?,
            error_message: row.try_get("error_message")?,
            started_at: row.try_get("started_at")?,
            completed_at: row.try_get("completed_at")?,
        })
    }
}

/// Open a history row in `running` state and return its id.
pub async fn insert_sync_history(
    db: &Db,
    source: SyncSource,
    endpoint: &str,
) -> Result<i64, sqlx::Error> {
    let now = now_utc();
    let row = sqlx::query(
        r#"
        INSERT INTO sync_history (
            source_id, endpoint, status, record_count, started_at, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(source.id())
    .bind(endpoint)
    .bind(SyncStatus::Running.as_str())
    .bind(0i64)
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .fetch_one(&db.pool)
    .await?;

    row.try_get(0)
}

/// Close a history row with its terminal status.
pub async fn update_sync_history(
    db: &Db,
    id: i64,
    status: SyncStatus,
    record_count: i64,
    error_message: Option<&str>,
) -> Result<(), sqlx::Error> {
    let now = now_utc();
    sqlx::query(
        r#"
        UPDATE sync_history SET
            status = $1,
            record_count = $2,
            error_message = $3,
            completed_at = $4,
            updated_at = $5
        WHERE id = $6
        "#,
    )
    .bind(status.as_str())
    .bind(record_count)
    .bind(error_message)
    .bind(&now)
    .bind(&now)
    .bind(id)
    .execute(&db.pool)
    .await?;
    Ok(())
}

/// The most recent runs, newest first.
pub async fn list_sync_history(db: &Db, limit: i64) -> Result<Vec<SyncHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, SyncHistoryRow>(
        r#"
        SELECT h.id, h.source_id, s.key AS source_key, h.endpoint, h.status,
               h.record_count, h.error_message, h.started_at, h.completed_at
        FROM sync_history h
        JOIN sync_sources s ON s.id = h.source_id
        ORDER BY h.id DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&db.pool)
    .await
}

/// The latest run per source, for the status endpoint.
pub async fn latest_sync_per_source(db: &Db) -> Result<Vec<SyncHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, SyncHistoryRow>(
        r#"
        SELECT h.id, h.source_id, s.key AS source_key, h.endpoint, h.status,
               h.record_count, h.error_message, h.started_at, h.completed_at
        FROM sync_history h
        JOIN sync_sources s ON s.id = h.source_id
        JOIN (
            SELECT source_id, MAX(id) AS max_id
            FROM sync_history
            GROUP BY source_id
        ) latest ON latest.max_id = h.id
        ORDER BY h.source_id
        "#,
    )
    .fetch_all(&db.pool)
    .await
}

/// Fetch one history row by id.
pub async fn get_sync_history(db: &Db, id: i64) -> Result<Option<SyncHistoryRow>, sqlx::Error> {
    sqlx::query_as::<_, SyncHistoryRow>(
        r#"
        SELECT h.id, h.source_id, s.key AS source_key, h.endpoint, h.status,
               h.record_count, h.error_message, h.started_at, h.completed_at
        FROM sync_history h
        JOIN sync_sources s ON s.id = h.source_id
        WHERE h.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&db.pool)
    .await
}

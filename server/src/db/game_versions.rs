//! Database operations for the game_versions table.

use sqlx::Row;

use super::{now_utc, Db};

/// Incoming game version data from the Wiki syncer.
#[derive(Debug, Clone, Default)]
pub struct NewGameVersion {
    pub uuid: String,
    pub code: String,
    pub channel: Option<String>,
    pub is_default: bool,
    pub released_at: Option<String>,
}

/// Insert a game version by uuid or COALESCE-update the existing row.
/// Returns the row id.
pub async fn upsert_game_version(db: &Db, v: &NewGameVersion) -> Result<i64, sqlx::Error> {
    let now = now_utc();
    let row = sqlx::query(
        r#"
        INSERT INTO game_versions (uuid, code, channel, is_default, released_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (uuid) DO UPDATE SET
            code = COALESCE(NULLIF(excluded.code, ''), game_versions.code),
            channel = COALESCE(NULLIF(excluded.channel, ''), game_versions.channel),
            is_default = excluded.is_default,
            released_at = COALESCE(NULLIF(excluded.released_at, ''), game_versions.released_at),
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(&v.uuid)
    .bind(&v.code)
    .bind(&v.channel)
    .bind(v.is_default as i64)
    .bind(&v.released_at)
    .bind(&now)
    .bind(&now)
    .fetch_one(&db.pool)
    .await?;

    row.try_get(0)
}

/// Look up a version id by its code ("3.24.2").
pub async fn find_game_version_id_by_code(
    db: &Db,
    code: &str,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM game_versions WHERE code = $1 ORDER BY id LIMIT 1")
        .bind(code)
        .fetch_optional(&db.pool)
        .await?;
    row.map(|r| r.try_get(0)).transpose()
}

//! Database operations for the manufacturers table.

use sqlx::Row;

use super::{now_utc, Db};

/// Incoming manufacturer data from the Wiki syncer.
#[derive(Debug, Clone, Default)]
pub struct NewManufacturer {
    pub uuid: String,
    pub name: String,
    pub slug: Option<String>,
    pub code: Option<String>,
}

/// Insert a manufacturer by uuid or COALESCE-update the existing row.
/// Returns the row id.
pub async fn upsert_manufacturer(db: &Db, m: &NewManufacturer) -> Result<i64, sqlx::Error> {
    let now = now_utc();
    let row = sqlx::query(
        r#"
        INSERT INTO manufacturers (uuid, name, slug, code, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (uuid) DO UPDATE SET
            name = COALESCE(NULLIF(excluded.name, ''), manufacturers.name),
            slug = COALESCE(NULLIF(excluded.slug, ''), manufacturers.slug),
            code = COALESCE(NULLIF(excluded.code, ''), manufacturers.code),
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(&m.uuid)
    .bind(&m.name)
    .bind(&m.slug)
    .bind(&m.code)
    .bind(&now)
    .bind(&now)
    .fetch_one(&db.pool)
    .await?;

    row.try_get(0)
}

pub async fn count_manufacturers(db: &Db) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) FROM manufacturers")
        .fetch_one(&db.pool)
        .await?;
    row.try_get(0)
}

//! Database operations for user fleets and paint ownership.
//!
//! Fleet entries never copy vehicle data; every display field comes from
//! the reference JOINs in [`list_user_fleet`]. Missing references produce
//! NULL fields, never dropped rows.

use sqlx::Row;

use super::{now_utc, Db};

/// One fleet entry ready for insertion.
#[derive(Debug, Clone, Default)]
pub struct NewFleetEntry {
    pub vehicle_id: Option<i64>,
    pub insurance_type_id: Option<i64>,
    pub warbond: bool,
    pub is_loaner: bool,
    pub pledge_id: Option<String>,
    pub pledge_name: Option<String>,
    pub pledge_cost: Option<f64>,
    pub pledge_date: Option<String>,
    pub custom_name: Option<String>,
    pub imported_at: String,
}

/// One fleet entry joined against the reference tables.
#[derive(Debug, Clone)]
pub struct UserFleetView {
    pub id: i64,
    pub user_id: i64,
    pub vehicle_id: Option<i64>,
    pub vehicle_slug: Option<String>,
    pub vehicle_name: Option<String>,
    pub manufacturer_name: Option<String>,
    pub insurance_key: Option<String>,
    pub insurance_label: Option<String>,
    pub insurance_is_lifetime: Option<bool>,
    pub warbond: bool,
    pub is_loaner: bool,
    pub pledge_id: Option<String>,
    pub pledge_name: Option<String>,
    pub pledge_cost: Option<f64>,
    pub pledge_date: Option<String>,
    pub custom_name: Option<String>,
    pub equipped_paint_name: Option<String>,
    pub imported_at: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::any::AnyRow> for UserFleetView {
    fn from_row(row: &'r sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
        Ok(UserFleetView {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            vehicle_slug: row.try_get("vehicle_slug")?,
            vehicle_name: row.try_get("vehicle_name")?,
            manufacturer_name: row.try_get("manufacturer_name")?,
            insurance_key: row.try_get("insurance_key")?,
            insurance_label: row.try_get("insurance_label")?,
            insurance_is_lifetime: row
                .try_get::<Option<i64>, _>("insurance_is_lifetime")?
                .map(|v| v != 0),
            warbond: row.try_get::<i64, _>("warbond")? != 0,
            is_loaner: row.try_get::<i64, _>("is_loaner")? != 0,
            pledge_id: row.try_get("pledge_id")?,
            pledge_name: row.try_get("pledge_name")?,
            pledge_cost: row.try_get("pledge_cost")?,
            pledge_date: row.try_get("pledge_date")?,
            custom_name: row.try_get("custom_name")?,
            equipped_paint_name: row.try_get("equipped_paint_name")?,
            imported_at: row.try_get("imported_at")?,
        })
    }
}

/// The user's fleet with all reference JOINs applied, in insertion order.
pub async fn list_user_fleet(db: &Db, user_id: i64) -> Result<Vec<UserFleetView>, sqlx::Error> {
    sqlx::query_as::<_, UserFleetView>(
        r#"
        SELECT f.id, f.user_id, f.vehicle_id,
               v.slug AS vehicle_slug, v.name AS vehicle_name,
               m.name AS manufacturer_name,
               i.key AS insurance_key, i.label AS insurance_label,
               i.is_lifetime AS insurance_is_lifetime,
               f.warbond, f.is_loaner, f.pledge_id, f.pledge_name,
               f.pledge_cost, f.pledge_date, f.custom_name,
               p.name AS equipped_paint_name, f.imported_at
        FROM user_fleet f
        LEFT JOIN vehicles v ON v.id = f.vehicle_id
        LEFT JOIN manufacturers m ON m.id = v.manufacturer_id
        LEFT JOIN insurance_types i ON i.id = f.insurance_type_id
        LEFT JOIN paints p ON p.id = f.equipped_paint_id
        WHERE f.user_id = $1
        ORDER BY f.id
        "#,
    )
    .bind(user_id)
    .fetch_all(&db.pool)
    .await
}

/// Atomically replace the user's entire fleet.
///
/// Deletes every existing row for the user and inserts the new entries in
/// one transaction; a failure partway leaves the previous fleet intact.
pub async fn replace_user_fleet(
    db: &Db,
    user_id: i64,
    entries: &[NewFleetEntry],
) -> Result<u64, sqlx::Error> {
    let now = now_utc();
    let mut tx = db.pool.begin().await?;

    sqlx::query("DELETE FROM user_fleet WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO user_fleet (
                user_id, vehicle_id, insurance_type_id, warbond, is_loaner,
                pledge_id, pledge_name, pledge_cost, pledge_date, custom_name,
                imported_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user_id)
        .bind(entry.vehicle_id)
        .bind(entry.insurance_type_id)
        .bind(entry.warbond as i64)
        .bind(entry.is_loaner as i64)
        .bind(&entry.pledge_id)
        .bind(&entry.pledge_name)
        .bind(entry.pledge_cost)
        .bind(&entry.pledge_date)
        .bind(&entry.custom_name)
        .bind(&entry.imported_at)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(entries.len() as u64)
}

/// Rename one fleet entry.
pub async fn set_fleet_custom_name(
    db: &Db,
    entry_id: i64,
    custom_name: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let now = now_utc();
    let result = sqlx::query("UPDATE user_fleet SET custom_name = $1, updated_at = $2 WHERE id = $3")
        .bind(custom_name)
        .bind(&now)
        .bind(entry_id)
        .execute(&db.pool)
        .await?;
    Ok(result.rows_affected())
}

/// Equip (or clear) a paint on one fleet entry.
pub async fn set_fleet_paint(
    db: &Db,
    entry_id: i64,
    paint_id: Option<i64>,
) -> Result<u64, sqlx::Error> {
    let now = now_utc();
    let result =
        sqlx::query("UPDATE user_fleet SET equipped_paint_id = $1, updated_at = $2 WHERE id = $3")
            .bind(paint_id)
            .bind(&now)
            .bind(entry_id)
            .execute(&db.pool)
            .await?;
    Ok(result.rows_affected())
}

/// Record that the user owns a paint.
pub async fn add_user_paint(db: &Db, user_id: i64, paint_id: i64) -> Result<(), sqlx::Error> {
    let now = now_utc();
    let sql = format!(
        "{} user_paints (user_id, paint_id, created_at, updated_at) VALUES ($1, $2, $3, $4){}",
        db.dialect.insert_ignore(),
        db.dialect.insert_ignore_suffix()
    );
    sqlx::query(&sql)
        .bind(user_id)
        .bind(paint_id)
        .bind(&now)
        .bind(&now)
        .execute(&db.pool)
        .await?;
    Ok(())
}

/// Ids of every paint the user owns, in id order.
pub async fn list_user_paint_ids(db: &Db, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows = sqlx::query("SELECT paint_id FROM user_paints WHERE user_id = $1 ORDER BY paint_id")
        .bind(user_id)
        .fetch_all(&db.pool)
        .await?;
    rows.iter().map(|r| r.try_get(0)).collect()
}

pub async fn count_user_fleet(db: &Db, user_id: i64) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) FROM user_fleet WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&db.pool)
        .await?;
    row.try_get(0)
}

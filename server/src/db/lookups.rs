//! Reads over the seeded lookup tables.
//!
//! These tables are written only by [`crate::db::schema`]; everything here
//! is a lookup by key or a full listing.

use fleetdock_engine::InsuranceTypeRef;
use sqlx::Row;

use super::Db;

/// A stored insurance type.
#[derive(Debug, Clone)]
pub struct InsuranceTypeRow {
    pub id: i64,
    pub key: String,
    pub label: String,
    pub duration_months: Option<i64>,
    pub is_lifetime: bool,
}

impl InsuranceTypeRow {
    /// Shrink to the shape the engine resolver consumes.
    pub fn to_ref(&self) -> InsuranceTypeRef {
        InsuranceTypeRef {
            id: self.id,
            label: self.label.clone(),
            is_lifetime: self.is_lifetime,
        }
    }
}

/// All insurance types, in seed order.
pub async fn list_insurance_types(db: &Db) -> Result<Vec<InsuranceTypeRow>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, key, label, duration_months, is_lifetime FROM insurance_types ORDER BY id",
    )
    .fetch_all(&db.pool)
    .await?;

    rows.iter()
        .map(|r| {
            Ok(InsuranceTypeRow {
                id: r.try_get("id")?,
                key: r.try_get("key")?,
                label: r.try_get("label")?,
                duration_months: r.try_get("duration_months")?,
                is_lifetime: r.try_get::<i64, _>("is_lifetime")? != 0,
            })
        })
        .collect()
}

/// Look up a production status id by key ("flight_ready").
pub async fn find_production_status_id(db: &Db, key: &str) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM production_statuses WHERE key = $1")
        .bind(key)
        .fetch_optional(&db.pool)
        .await?;
    row.map(|r| r.try_get(0)).transpose()
}

/// Look up a vehicle type id by key ("ship").
pub async fn find_vehicle_type_id(db: &Db, key: &str) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM vehicle_types WHERE key = $1")
        .bind(key)
        .fetch_optional(&db.pool)
        .await?;
    row.map(|r| r.try_get(0)).transpose()
}

//! Database operations for the vehicles table and its satellites.
//!
//! `slug` is the stable identity of a vehicle: the upsert conflicts on it
//! and never rewrites it. Non-image columns are only written here and in
//! no image-sync path; image columns are only written by
//! [`update_vehicle_images`], which touches nothing else. Both writes use
//! COALESCE so an empty incoming value never clobbers a stored one.

use fleetdock_engine::{ImageSet, VehicleNameSlug};
use sqlx::Row;

use super::{now_utc, Db};

/// Incoming vehicle data, typically from the Wiki syncer.
#[derive(Debug, Clone, Default)]
pub struct NewVehicle {
    pub uuid: Option<String>,
    pub slug: String,
    pub name: String,
    pub class_name: Option<String>,
    pub manufacturer_id: Option<i64>,
    pub vehicle_type_id: Option<i64>,
    pub production_status_id: Option<i64>,
    pub description: Option<String>,
    pub length: Option<f64>,
    pub beam: Option<f64>,
    pub height: Option<f64>,
    pub mass: Option<f64>,
    pub cargo: Option<f64>,
    pub crew_min: Option<i64>,
    pub crew_max: Option<i64>,
    pub speed_scm: Option<f64>,
    pub speed_max: Option<f64>,
    pub pledge_price: Option<f64>,
    pub pledge_url: Option<String>,
    pub game_version_id: Option<i64>,
}

/// A stored vehicle row.
#[derive(Debug, Clone)]
pub struct VehicleRow {
    pub id: i64,
    pub uuid: Option<String>,
    pub slug: String,
    pub name: String,
    pub class_name: Option<String>,
    pub manufacturer_id: Option<i64>,
    pub length: Option<f64>,
    pub cargo: Option<f64>,
    pub pledge_price: Option<f64>,
    pub images: ImageSet,
}

impl<'r> sqlx::FromRow<'r, sqlx::any::AnyRow> for VehicleRow {
    fn from_row(row: &'r sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
        Ok(VehicleRow {
            id: row.try_get("id")?,
            uuid: row.try_get("uuid")?,
            slug: row.try_get("slug")?,
            name: row.try_get("name")?,
            class_name: row.try_get("class_name")?,
            manufacturer_id: row.try_get("manufacturer_id")?,
            length: row.try_get("length")?,
            cargo: row.try_get("cargo")?,
            pledge_price: row.try_get("pledge_price")?,
            images: ImageSet {
                source: row.try_get("image_source")?,
                small: row.try_get("image_small")?,
                medium: row.try_get("image_medium")?,
                large: row.try_get("image_large")?,
            },
        })
    }
}

/// Hardpoint data nested under a wiki vehicle.
#[derive(Debug, Clone)]
pub struct NewPort {
    pub uuid: String,
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub size_min: Option<i64>,
    pub size_max: Option<i64>,
    pub port_type: Option<String>,
}

/// Insert a vehicle by slug or update the existing row.
///
/// Every non-empty incoming field wins; empty or NULL fields keep the
/// stored value. Image columns are deliberately absent. Returns the row id.
pub async fn upsert_vehicle(db: &Db, v: &NewVehicle) -> Result<i64, sqlx::Error> {
    let now = now_utc();
    let row = sqlx::query(
        r#"
        INSERT INTO vehicles (
            uuid, slug, name, class_name, manufacturer_id, vehicle_type_id,
            production_status_id, description, length, beam, height, mass,
            cargo, crew_min, crew_max, speed_scm, speed_max, pledge_price,
            pledge_url, game_version_id, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22)
        ON CONFLICT (slug) DO UPDATE SET
            uuid = COALESCE(NULLIF(excluded.uuid, ''), vehicles.uuid),
            name = COALESCE(NULLIF(excluded.name, ''), vehicles.name),
            class_name = COALESCE(NULLIF(excluded.class_name, ''), vehicles.class_name),
            manufacturer_id = COALESCE(excluded.manufacturer_id, vehicles.manufacturer_id),
            vehicle_type_id = COALESCE(excluded.vehicle_type_id, vehicles.vehicle_type_id),
            production_status_id = COALESCE(excluded.production_status_id, vehicles.production_status_id),
            description = COALESCE(NULLIF(excluded.description, ''), vehicles.description),
            length = COALESCE(excluded.length, vehicles.length),
            beam = COALESCE(excluded.beam, vehicles.beam),
            height = COALESCE(excluded.height, vehicles.height),
            mass = COALESCE(excluded.mass, vehicles.mass),
            cargo = COALESCE(excluded.cargo, vehicles.cargo),
            crew_min = COALESCE(excluded.crew_min, vehicles.crew_min),
            crew_max = COALESCE(excluded.crew_max, vehicles.crew_max),
            speed_scm = COALESCE(excluded.speed_scm, vehicles.speed_scm),
            speed_max = COALESCE(excluded.speed_max, vehicles.speed_max),
            pledge_price = COALESCE(excluded.pledge_price, vehicles.pledge_price),
            pledge_url = COALESCE(NULLIF(excluded.pledge_url, ''), vehicles.pledge_url),
            game_version_id = COALESCE(excluded.game_version_id, vehicles.game_version_id),
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(&v.uuid)
    .bind(&v.slug)
    .bind(&v.name)
    .bind(&v.class_name)
    .bind(v.manufacturer_id)
    .bind(v.vehicle_type_id)
    .bind(v.production_status_id)
    .bind(&v.description)
    .bind(v.length)
    .bind(v.beam)
    .bind(v.height)
    .bind(v.mass)
    .bind(v.cargo)
    .bind(v.crew_min)
    .bind(v.crew_max)
    .bind(v.speed_scm)
    .bind(v.speed_max)
    .bind(v.pledge_price)
    .bind(&v.pledge_url)
    .bind(v.game_version_id)
    .bind(&now)
    .bind(&now)
    .fetch_one(&db.pool)
    .await?;

    row.try_get(0)
}

/// Image-only update for one vehicle. Returns affected rows (0 when the
/// slug is unknown). Other columns are never touched; idempotent.
pub async fn update_vehicle_images(
    db: &Db,
    slug: &str,
    images: &ImageSet,
) -> Result<u64, sqlx::Error> {
    let now = now_utc();
    let result = sqlx::query(
        r#"
        UPDATE vehicles SET
            image_source = COALESCE(NULLIF($1, ''), image_source),
            image_small = COALESCE(NULLIF($2, ''), image_small),
            image_medium = COALESCE(NULLIF($3, ''), image_medium),
            image_large = COALESCE(NULLIF($4, ''), image_large),
            updated_at = $5
        WHERE slug = $6
        "#,
    )
    .bind(&images.source)
    .bind(&images.small)
    .bind(&images.medium)
    .bind(&images.large)
    .bind(&now)
    .bind(slug)
    .execute(&db.pool)
    .await?;

    Ok(result.rows_affected())
}

/// Fetch one vehicle by slug.
pub async fn get_vehicle_by_slug(db: &Db, slug: &str) -> Result<Option<VehicleRow>, sqlx::Error> {
    sqlx::query_as::<_, VehicleRow>(
        r#"
        SELECT id, uuid, slug, name, class_name, manufacturer_id, length, cargo,
               pledge_price, image_source, image_small, image_medium, image_large
        FROM vehicles
        WHERE slug = $1
        "#,
    )
    .bind(slug)
    .fetch_optional(&db.pool)
    .await
}

/// Exact slug lookup.
pub async fn find_vehicle_id_by_slug(db: &Db, slug: &str) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT id FROM vehicles WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&db.pool)
        .await?;
    row.map(|r| r.try_get(0)).transpose()
}

/// Vehicles whose slug matches a caller-supplied LIKE pattern, in slug order.
pub async fn find_vehicle_ids_by_slug_like(
    db: &Db,
    pattern: &str,
) -> Result<Vec<i64>, sqlx::Error> {
    let rows = sqlx::query("SELECT id FROM vehicles WHERE slug LIKE $1 ORDER BY slug")
        .bind(pattern)
        .fetch_all(&db.pool)
        .await?;
    rows.iter().map(|r| r.try_get(0)).collect()
}

/// Vehicles whose slug extends `prefix` with another dash segment
/// (`aurora` finds `aurora-cl`, `aurora-es`, ...), in slug order.
pub async fn find_vehicle_ids_by_slug_prefix(
    db: &Db,
    prefix: &str,
) -> Result<Vec<i64>, sqlx::Error> {
    find_vehicle_ids_by_slug_like(db, &format!("{prefix}-%")).await
}

/// Vehicles whose name contains a fragment, case-insensitively, in name order.
pub async fn find_vehicle_ids_by_name_contains(
    db: &Db,
    fragment: &str,
) -> Result<Vec<i64>, sqlx::Error> {
    let pattern = format!("%{}%", fragment.to_lowercase());
    let rows = sqlx::query("SELECT id FROM vehicles WHERE LOWER(name) LIKE $1 ORDER BY name")
        .bind(pattern)
        .fetch_all(&db.pool)
        .await?;
    rows.iter().map(|r| r.try_get(0)).collect()
}

/// Every vehicle's display name and slug, for the matching cascades.
pub async fn get_all_vehicle_name_slugs(db: &Db) -> Result<Vec<VehicleNameSlug>, sqlx::Error> {
    let rows = sqlx::query("SELECT name, slug FROM vehicles ORDER BY slug")
        .fetch_all(&db.pool)
        .await?;
    rows.iter()
        .map(|r| {
            Ok(VehicleNameSlug {
                name: r.try_get("name")?,
                slug: r.try_get("slug")?,
            })
        })
        .collect()
}

/// Resolve many slugs to ids in one query, in slug order. Unknown slugs
/// are simply absent from the result.
pub async fn find_vehicle_ids_by_slugs(
    db: &Db,
    slugs: &[String],
) -> Result<Vec<(String, i64)>, sqlx::Error> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT slug, id FROM vehicles WHERE slug IN ({}) ORDER BY slug",
        db.dialect.placeholders(1, slugs.len())
    );
    let mut query = sqlx::query(&sql);
    for slug in slugs {
        query = query.bind(slug);
    }
    let rows = query.fetch_all(&db.pool).await?;
    rows.iter()
        .map(|r| Ok((r.try_get("slug")?, r.try_get("id")?)))
        .collect()
}

/// Every vehicle's slug and id, for the hangar importer.
pub async fn get_all_vehicle_slug_ids(db: &Db) -> Result<Vec<(String, i64)>, sqlx::Error> {
    let rows = sqlx::query("SELECT slug, id FROM vehicles ORDER BY slug")
        .fetch_all(&db.pool)
        .await?;
    rows.iter()
        .map(|r| Ok((r.try_get("slug")?, r.try_get("id")?)))
        .collect()
}

pub async fn count_vehicles(db: &Db) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) FROM vehicles")
        .fetch_one(&db.pool)
        .await?;
    row.try_get(0)
}

/// Replace the loaner links for one vehicle in a single transaction.
pub async fn set_vehicle_loaners(
    db: &Db,
    vehicle_id: i64,
    loaner_ids: &[i64],
) -> Result<(), sqlx::Error> {
    let now = now_utc();
    let insert = format!(
        "{} vehicle_loaners (vehicle_id, loaner_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4){}",
        db.dialect.insert_ignore(),
        db.dialect.insert_ignore_suffix()
    );

    let mut tx = db.pool.begin().await?;
    sqlx::query("DELETE FROM vehicle_loaners WHERE vehicle_id = $1")
        .bind(vehicle_id)
        .execute(&mut *tx)
        .await?;
    for loaner_id in loaner_ids {
        sqlx::query(&insert)
            .bind(vehicle_id)
            .bind(loaner_id)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

/// Insert or update one hardpoint, unique per (vehicle, uuid).
pub async fn upsert_port(db: &Db, vehicle_id: i64, port: &NewPort) -> Result<(), sqlx::Error> {
    let now = now_utc();
    sqlx::query(
        r#"
        INSERT INTO ports (
            vehicle_id, uuid, name, class_name, size_min, size_max, port_type,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (vehicle_id, uuid) DO UPDATE SET
            name = COALESCE(NULLIF(excluded.name, ''), ports.name),
            class_name = COALESCE(NULLIF(excluded.class_name, ''), ports.class_name),
            size_min = COALESCE(excluded.size_min, ports.size_min),
            size_max = COALESCE(excluded.size_max, ports.size_max),
            port_type = COALESCE(NULLIF(excluded.port_type, ''), ports.port_type),
            updated_at = excluded.updated_at
        "#,
    )
    .bind(vehicle_id)
    .bind(&port.uuid)
    .bind(&port.name)
    .bind(&port.class_name)
    .bind(port.size_min)
    .bind(port.size_max)
    .bind(&port.port_type)
    .bind(&now)
    .bind(&now)
    .execute(&db.pool)
    .await?;
    Ok(())
}

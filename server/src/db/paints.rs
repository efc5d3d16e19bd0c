//! Database operations for paints and the paint-vehicle join table.

use fleetdock_engine::{ImageSet, PaintNameClass};
use sqlx::Row;

use super::{now_utc, Db};

/// Incoming paint metadata from the Scunpacked syncer.
#[derive(Debug, Clone, Default)]
pub struct NewPaint {
    pub name: String,
    pub slug: Option<String>,
    pub class_name: String,
    pub description: Option<String>,
}

/// A stored paint row.
#[derive(Debug, Clone)]
pub struct PaintRow {
    pub id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub class_name: String,
    pub description: Option<String>,
    pub images: ImageSet,
}

impl<'r> sqlx::FromRow<'r, sqlx::any::AnyRow> for PaintRow {
    fn from_row(row: &'r sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
        Ok(PaintRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            class_name: row.try_get("class_name")?,
            description: row.try_get("description")?,
            images: ImageSet {
                source: row.try_get("image_source")?,
                small: row.try_get("image_small")?,
                medium: row.try_get("image_medium")?,
                large: row.try_get("image_large")?,
            },
        })
    }
}

impl PaintRow {
    /// Shrink to the shape the matching cascade consumes.
    pub fn to_name_class(&self) -> PaintNameClass {
        PaintNameClass {
            name: self.name.clone(),
            class_name: self.class_name.clone(),
            has_image: !self.images.is_empty(),
        }
    }
}

/// Insert a paint by class name or COALESCE-update the existing row.
///
/// Returns the row id. Drivers that return no id for a no-op upsert are
/// covered by the SELECT fallback.
pub async fn upsert_paint(db: &Db, p: &NewPaint) -> Result<i64, sqlx::Error> {
    let now = now_utc();
    let row = sqlx::query(
        r#"
        INSERT INTO paints (name, slug, class_name, description, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (class_name) DO UPDATE SET
            name = COALESCE(NULLIF(excluded.name, ''), paints.name),
            slug = COALESCE(NULLIF(excluded.slug, ''), paints.slug),
            description = COALESCE(NULLIF(excluded.description, ''), paints.description),
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(&p.name)
    .bind(&p.slug)
    .bind(&p.class_name)
    .bind(&p.description)
    .bind(&now)
    .bind(&now)
    .fetch_optional(&db.pool)
    .await?;

    if let Some(row) = row {
        return row.try_get(0);
    }
    let row = sqlx::query("SELECT id FROM paints WHERE class_name = $1")
        .bind(&p.class_name)
        .fetch_one(&db.pool)
        .await?;
    row.try_get(0)
}

/// Image-only update for one paint, keyed by class name. Idempotent.
pub async fn update_paint_images(
    db: &Db,
    class_name: &str,
    images: &ImageSet,
) -> Result<u64, sqlx::Error> {
    let now = now_utc();
    let result = sqlx::query(
        r#"
        UPDATE paints SET
            image_source = COALESCE(NULLIF($1, ''), image_source),
            image_small = COALESCE(NULLIF($2, ''), image_small),
            image_medium = COALESCE(NULLIF($3, ''), image_medium),
            image_large = COALESCE(NULLIF($4, ''), image_large),
            updated_at = $5
        WHERE class_name = $6
        "#,
    )
    .bind(&images.source)
    .bind(&images.small)
    .bind(&images.medium)
    .bind(&images.large)
    .bind(&now)
    .bind(class_name)
    .execute(&db.pool)
    .await?;

    Ok(result.rows_affected())
}

/// Replace the vehicle links for one paint in a single transaction.
pub async fn set_paint_vehicles(
    db: &Db,
    paint_id: i64,
    vehicle_ids: &[i64],
) -> Result<(), sqlx::Error> {
    let now = now_utc();
    let insert = format!(
        "{} paint_vehicles (paint_id, vehicle_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4){}",
        db.dialect.insert_ignore(),
        db.dialect.insert_ignore_suffix()
    );

    let mut tx = db.pool.begin().await?;
    sqlx::query("DELETE FROM paint_vehicles WHERE paint_id = $1")
        .bind(paint_id)
        .execute(&mut *tx)
        .await?;
    for vehicle_id in vehicle_ids {
        sqlx::query(&insert)
            .bind(paint_id)
            .bind(vehicle_id)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

/// Every paint's name, class name, and whether any image is stored.
pub async fn get_all_paint_name_classes(db: &Db) -> Result<Vec<PaintNameClass>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT name, class_name,
               CASE WHEN COALESCE(image_source, '') <> ''
                      OR COALESCE(image_small, '') <> ''
                      OR COALESCE(image_medium, '') <> ''
                      OR COALESCE(image_large, '') <> ''
                    THEN 1 ELSE 0 END AS has_image
        FROM paints
        ORDER BY name
        "#,
    )
    .fetch_all(&db.pool)
    .await?;

    rows.iter()
        .map(|r| {
            Ok(PaintNameClass {
                name: r.try_get("name")?,
                class_name: r.try_get("class_name")?,
                has_image: r.try_get::<i64, _>("has_image")? != 0,
            })
        })
        .collect()
}

/// Slugs of every vehicle that has at least one linked paint, in order.
pub async fn get_vehicle_slugs_with_paints(db: &Db) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT v.slug
        FROM vehicles v
        JOIN paint_vehicles pv ON pv.vehicle_id = v.id
        ORDER BY v.slug
        "#,
    )
    .fetch_all(&db.pool)
    .await?;
    rows.iter().map(|r| r.try_get(0)).collect()
}

/// All paints linked to one vehicle, in name order.
pub async fn get_paints_by_vehicle_slug(
    db: &Db,
    slug: &str,
) -> Result<Vec<PaintRow>, sqlx::Error> {
    sqlx::query_as::<_, PaintRow>(
        r#"
        SELECT p.id, p.name, p.slug, p.class_name, p.description,
               p.image_source, p.image_small, p.image_medium, p.image_large
        FROM paints p
        JOIN paint_vehicles pv ON pv.paint_id = p.id
        JOIN vehicles v ON v.id = pv.vehicle_id
        WHERE v.slug = $1
        ORDER BY p.name
        "#,
    )
    .bind(slug)
    .fetch_all(&db.pool)
    .await
}

/// Fetch one paint by class name.
pub async fn get_paint_by_class_name(
    db: &Db,
    class_name: &str,
) -> Result<Option<PaintRow>, sqlx::Error> {
    sqlx::query_as::<_, PaintRow>(
        r#"
        SELECT id, name, slug, class_name, description,
               image_source, image_small, image_medium, image_large
        FROM paints
        WHERE class_name = $1
        "#,
    )
    .bind(class_name)
    .fetch_optional(&db.pool)
    .await
}

pub async fn count_paints(db: &Db) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) FROM paints")
        .fetch_one(&db.pool)
        .await?;
    row.try_get(0)
}

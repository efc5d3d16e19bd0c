//! Database operations for the six item taxonomies.
//!
//! Components, FPS weapons, armour, attachments, ammo, and utilities all
//! share one row shape and one upsert, parameterized by table. Each table
//! is unique by in-game uuid.

use sqlx::Row;

use super::{now_utc, Db};

/// The six item taxonomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Component,
    FpsWeapon,
    FpsArmour,
    FpsAttachment,
    FpsAmmo,
    FpsUtility,
}

impl ItemKind {
    /// All kinds, in sync order.
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Component,
        ItemKind::FpsWeapon,
        ItemKind::FpsArmour,
        ItemKind::FpsAttachment,
        ItemKind::FpsAmmo,
        ItemKind::FpsUtility,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            ItemKind::Component => "components",
            ItemKind::FpsWeapon => "fps_weapons",
            ItemKind::FpsArmour => "fps_armour",
            ItemKind::FpsAttachment => "fps_attachments",
            ItemKind::FpsAmmo => "fps_ammo",
            ItemKind::FpsUtility => "fps_utilities",
        }
    }

    /// Upstream endpoint segment for this taxonomy.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ItemKind::Component => "components",
            ItemKind::FpsWeapon => "fps-weapons",
            ItemKind::FpsArmour => "fps-armour",
            ItemKind::FpsAttachment => "fps-attachments",
            ItemKind::FpsAmmo => "fps-ammo",
            ItemKind::FpsUtility => "fps-utilities",
        }
    }
}

/// Incoming item data from the Wiki syncer.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub uuid: String,
    pub name: String,
    pub class_name: Option<String>,
    pub size: Option<i64>,
    pub grade: Option<String>,
    pub item_type: Option<String>,
    pub manufacturer_name: Option<String>,
    pub description: Option<String>,
}

/// Insert an item by uuid or COALESCE-update the existing row.
/// Returns the row id.
pub async fn upsert_item(db: &Db, kind: ItemKind, item: &NewItem) -> Result<i64, sqlx::Error> {
    let now = now_utc();
    let table = kind.table();
    let sql = format!(
        r#"
        INSERT INTO {table} (
            uuid, name, class_name, size, grade, item_type, manufacturer_name,
            description, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (uuid) DO UPDATE SET
            name = COALESCE(NULLIF(excluded.name, ''), {table}.name),
            class_name = COALESCE(NULLIF(excluded.class_name, ''), {table}.class_name),
            size = COALESCE(excluded.size, {table}.size),
            grade = COALESCE(NULLIF(excluded.grade, ''), {table}.grade),
            item_type = COALESCE(NULLIF(excluded.item_type, ''), {table}.item_type),
            manufacturer_name = COALESCE(NULLIF(excluded.manufacturer_name, ''), {table}.manufacturer_name),
            description = COALESCE(NULLIF(excluded.description, ''), {table}.description),
            updated_at = excluded.updated_at
        RETURNING id
        "#
    );

    let row = sqlx::query(&sql)
        .bind(&item.uuid)
        .bind(&item.name)
        .bind(&item.class_name)
        .bind(item.size)
        .bind(&item.grade)
        .bind(&item.item_type)
        .bind(&item.manufacturer_name)
        .bind(&item.description)
        .bind(&now)
        .bind(&now)
        .fetch_one(&db.pool)
        .await?;

    row.try_get(0)
}

pub async fn count_items(db: &Db, kind: ItemKind) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
    let row = sqlx::query(&sql).fetch_one(&db.pool).await?;
    row.try_get(0)
}

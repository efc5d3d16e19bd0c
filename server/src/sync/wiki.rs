//! Star Citizen Wiki syncer, the primary data source.
//!
//! Runs in dependency order: manufacturers, then game versions, then
//! vehicles (each vehicle row lands before its ports and loaner links),
//! then the six item taxonomies. Rows are keyed by upstream uuid. This
//! syncer never writes image columns; those belong to the image sources.

use std::collections::HashMap;

use fleetdock_engine::slug_from_name;
use tokio_util::sync::CancellationToken;

use crate::clients::wiki::{WikiApi, WikiVehicle};
use crate::db::game_versions::NewGameVersion;
use crate::db::items::{ItemKind, NewItem};
use crate::db::manufacturers::NewManufacturer;
use crate::db::vehicles::{NewPort, NewVehicle};
use crate::db::{self, Db};
use crate::error::Result;

use super::ensure_active;

pub(crate) async fn run(db: &Db, api: &dyn WikiApi, cancel: &CancellationToken) -> Result<i64> {
    let mut count = 0i64;

    let manufacturer_ids = sync_manufacturers(db, api, cancel, &mut count).await?;
    ensure_active(cancel)?;

    let version_ids = sync_game_versions(db, api, cancel, &mut count).await?;
    ensure_active(cancel)?;

    sync_vehicles(db, api, cancel, &manufacturer_ids, &version_ids, &mut count).await?;
    ensure_active(cancel)?;

    for kind in ItemKind::ALL {
        sync_items(db, api, kind, cancel, &mut count).await?;
        ensure_active(cancel)?;
    }

    Ok(count)
}

async fn sync_manufacturers(
    db: &Db,
    api: &dyn WikiApi,
    cancel: &CancellationToken,
    count: &mut i64,
) -> Result<HashMap<String, i64>> {
    let manufacturers = api.manufacturers(cancel).await?;
    let mut ids = HashMap::with_capacity(manufacturers.len());
    for m in manufacturers {
        let Some(uuid) = m.uuid.filter(|u| !u.is_empty()) else {
            tracing::debug!(name = %m.name, "manufacturer without uuid, skipping");
            continue;
        };
        let row = NewManufacturer {
            uuid: uuid.clone(),
            name: m.name,
            slug: m.slug,
            code: m.code,
        };
        match db::manufacturers::upsert_manufacturer(db, &row).await {
            Ok(id) => {
                ids.insert(uuid, id);
                *count += 1;
            }
            Err(err) if db::is_constraint_violation(&err) => {
                tracing::warn!(uuid = %row.uuid, error = %err, "manufacturer rejected by constraint, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(ids)
}

async fn sync_game_versions(
    db: &Db,
    api: &dyn WikiApi,
    cancel: &CancellationToken,
    count: &mut i64,
) -> Result<HashMap<String, i64>> {
    let versions = api.game_versions(cancel).await?;
    let mut ids = HashMap::with_capacity(versions.len());
    for v in versions {
        let Some(uuid) = v.uuid.filter(|u| !u.is_empty()) else {
            tracing::debug!(code = %v.code, "game version without uuid, skipping");
            continue;
        };
        let row = NewGameVersion {
            uuid,
            code: v.code.clone(),
            channel: v.channel,
            is_default: v.is_default,
            released_at: v.released_at,
        };
        match db::game_versions::upsert_game_version(db, &row).await {
            Ok(id) => {
                ids.insert(v.code, id);
                *count += 1;
            }
            Err(err) if db::is_constraint_violation(&err) => {
                tracing::warn!(uuid = %row.uuid, error = %err, "game version rejected by constraint, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(ids)
}

async fn sync_vehicles(
    db: &Db,
    api: &dyn WikiApi,
    cancel: &CancellationToken,
    manufacturer_ids: &HashMap<String, i64>,
    version_ids: &HashMap<String, i64>,
    count: &mut i64,
) -> Result<()> {
    let ship_type = db::lookups::find_vehicle_type_id(db, "ship").await?;
    let ground_type = db::lookups::find_vehicle_type_id(db, "ground_vehicle").await?;

    let vehicles = api.vehicles(cancel).await?;
    // loaner links resolve after every vehicle row exists
    let mut loaner_links: Vec<(i64, Vec<String>)> = Vec::new();

    for v in &vehicles {
        ensure_active(cancel)?;
        let slug = v
            .slug
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slug_from_name(&v.name));
        if slug.is_empty() {
            tracing::debug!(name = %v.name, "vehicle without usable slug, skipping");
            continue;
        }

        let row = vehicle_row(db, v, slug, manufacturer_ids, version_ids, ship_type, ground_type)
            .await?;
        let vehicle_id = match db::vehicles::upsert_vehicle(db, &row).await {
            Ok(id) => id,
            Err(err) if db::is_constraint_violation(&err) => {
                tracing::warn!(slug = %row.slug, error = %err, "vehicle rejected by constraint, skipping");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        *count += 1;

        for port in &v.ports {
            let Some(uuid) = port.uuid.clone().filter(|u| !u.is_empty()) else {
                continue;
            };
            let port_row = NewPort {
                uuid,
                name: port.name.clone(),
                class_name: port.class_name.clone(),
                size_min: port.size_min,
                size_max: port.size_max,
                port_type: port.port_type.clone(),
            };
            match db::vehicles::upsert_port(db, vehicle_id, &port_row).await {
                Ok(()) => {}
                Err(err) if db::is_constraint_violation(&err) => {
                    tracing::warn!(slug = %row.slug, uuid = %port_row.uuid, error = %err, "port rejected by constraint, skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let loaner_slugs: Vec<String> = v
            .loaners
            .iter()
            .filter_map(|l| l.slug.clone())
            .filter(|s| !s.is_empty())
            .collect();
        if !loaner_slugs.is_empty() {
            loaner_links.push((vehicle_id, loaner_slugs));
        }
    }

    for (vehicle_id, slugs) in loaner_links {
        let resolved = db::vehicles::find_vehicle_ids_by_slugs(db, &slugs).await?;
        if resolved.len() < slugs.len() {
            tracing::debug!(
                vehicle_id,
                missing = slugs.len() - resolved.len(),
                "loaner links reference unknown vehicles"
            );
        }
        let loaner_ids: Vec<i64> = resolved.iter().map(|(_, id)| *id).collect();
        db::vehicles::set_vehicle_loaners(db, vehicle_id, &loaner_ids).await?;
    }

    Ok(())
}

async fn vehicle_row(
    db: &Db,
    v: &WikiVehicle,
    slug: String,
    manufacturer_ids: &HashMap<String, i64>,
    version_ids: &HashMap<String, i64>,
    ship_type: Option<i64>,
    ground_type: Option<i64>,
) -> Result<NewVehicle> {
    let manufacturer_id = v
        .manufacturer
        .as_ref()
        .and_then(|m| m.uuid.as_ref())
        .and_then(|uuid| manufacturer_ids.get(uuid))
        .copied();

    let vehicle_type_id = match &v.vehicle_type {
        Some(t) if t.to_lowercase().contains("ground") => ground_type,
        Some(_) => ship_type,
        None => None,
    };

    let production_status_id = match &v.production_status {
        Some(status) => db::lookups::find_production_status_id(db, &status_key(status)).await?,
        None => None,
    };

    let game_version_id = v
        .version
        .as_ref()
        .and_then(|code| version_ids.get(code))
        .copied();

    Ok(NewVehicle {
        uuid: v.uuid.clone(),
        slug,
        name: v.name.clone(),
        class_name: v.class_name.clone(),
        manufacturer_id,
        vehicle_type_id,
        production_status_id,
        description: v.description.clone(),
        length: v.length,
        beam: v.beam,
        height: v.height,
        mass: v.mass,
        cargo: v.cargo_capacity,
        crew_min: v.crew.min,
        crew_max: v.crew.max,
        speed_scm: v.speed.scm,
        speed_max: v.speed.max,
        pledge_price: v.pledge_price,
        pledge_url: v.pledge_url.clone(),
        game_version_id,
    })
}

/// `"Flight Ready"` -> `"flight_ready"`, matching the seeded keys.
fn status_key(status: &str) -> String {
    status.trim().to_lowercase().replace([' ', '-'], "_")
}

async fn sync_items(
    db: &Db,
    api: &dyn WikiApi,
    kind: ItemKind,
    cancel: &CancellationToken,
    count: &mut i64,
) -> Result<()> {
    let items = api.items(kind.endpoint(), cancel).await?;
    for item in items {
        let Some(uuid) = item.uuid.filter(|u| !u.is_empty()) else {
            tracing::debug!(name = %item.name, table = kind.table(), "item without uuid, skipping");
            continue;
        };
        let row = NewItem {
            uuid,
            name: item.name,
            class_name: item.class_name,
            size: item.size,
            grade: item.grade,
            item_type: item.item_type,
            manufacturer_name: item.manufacturer_name,
            description: item.description,
        };
        match db::items::upsert_item(db, kind, &row).await {
            Ok(_) => *count += 1,
            Err(err) if db::is_constraint_violation(&err) => {
                tracing::warn!(uuid = %row.uuid, table = kind.table(), error = %err, "item rejected by constraint, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_keys_normalize() {
        assert_eq!(status_key("Flight Ready"), "flight_ready");
        assert_eq!(status_key("flight-ready"), "flight_ready");
        assert_eq!(status_key(" In Concept "), "in_concept");
    }
}

//! Scunpacked paint-metadata syncer.
//!
//! Lists the data repository's `items/` directory, fetches every
//! `paint_*.json`, upserts the paint row, and resolves its `RequiredTags`
//! hull tag to vehicle links. Broken localisation names (`@item_Name...`)
//! are stored verbatim; the absence of a human-readable name is the flag.

use std::collections::BTreeSet;

use fleetdock_engine::{slug_from_name, slug_from_paint_tag, slug_from_ship_code};
use tokio_util::sync::CancellationToken;

use crate::clients::scunpacked::{is_paint_file, ScunpackedApi};
use crate::clients::HttpError;
use crate::db::paints::NewPaint;
use crate::db::{self, Db};
use crate::error::{Error, Result};

use super::ensure_active;

pub(crate) async fn run(
    db: &Db,
    api: &dyn ScunpackedApi,
    cancel: &CancellationToken,
) -> Result<i64> {
    let files = api.list_items(cancel).await?;
    let mut count = 0i64;
    let mut skipped = 0usize;

    for file in files.into_iter().filter(|f| is_paint_file(&f.name)) {
        ensure_active(cancel)?;
        let Some(url) = file.download_url.as_deref() else {
            tracing::debug!(file = %file.name, "listing entry without download url");
            skipped += 1;
            continue;
        };

        let record = match api.fetch_paint(url, cancel).await {
            Ok(record) => record,
            Err(HttpError::Cancelled) => return Err(Error::DeadlineExceeded),
            Err(err) => {
                tracing::warn!(file = %file.name, error = %err, "paint file fetch failed, skipping");
                skipped += 1;
                continue;
            }
        };

        let Some(class_name) = record.class_name.clone().filter(|c| !c.is_empty()) else {
            tracing::debug!(file = %file.name, "paint file without class name, skipping");
            skipped += 1;
            continue;
        };
        // localisation breakage keeps the raw key as the display name
        let name = record
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| class_name.clone());
        let slug = if name.starts_with('@') {
            slug_from_ship_code(&class_name)
        } else {
            slug_from_name(&name)
        };

        let paint = NewPaint {
            name,
            slug: Some(slug).filter(|s| !s.is_empty()),
            class_name: class_name.clone(),
            description: record.description.clone(),
        };
        let paint_id = match db::paints::upsert_paint(db, &paint).await {
            Ok(id) => id,
            Err(err) if db::is_constraint_violation(&err) => {
                tracing::warn!(class_name = %class_name, error = %err, "paint rejected by constraint, skipping");
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let vehicle_ids = resolve_paint_vehicles(db, record.paint_tag()).await?;
        if vehicle_ids.is_empty() {
            tracing::debug!(class_name = %class_name, "paint matched no vehicles");
        }
        db::paints::set_paint_vehicles(db, paint_id, &vehicle_ids).await?;
        count += 1;
    }

    tracing::info!(count, skipped, "scunpacked paints applied");
    Ok(count)
}

/// Resolve a `Paint_*` tag to vehicle ids: exact slug, then slug prefix,
/// then name fragment. All hits are kept, sorted, and deduplicated; a
/// paint may legitimately match nothing.
async fn resolve_paint_vehicles(db: &Db, tag: Option<&str>) -> Result<Vec<i64>> {
    let Some(tag) = tag else {
        return Ok(Vec::new());
    };
    let alias = slug_from_paint_tag(tag);
    if alias.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids = BTreeSet::new();
    ids.extend(db::vehicles::find_vehicle_ids_by_slug_like(db, &alias).await?);
    ids.extend(db::vehicles::find_vehicle_ids_by_slug_prefix(db, &alias).await?);
    let fragment = alias.replace('-', " ");
    ids.extend(db::vehicles::find_vehicle_ids_by_name_contains(db, &fragment).await?);

    Ok(ids.into_iter().collect())
}

//! RSI pledge-store syncer.
//!
//! Two passes against the GraphQL browse endpoint. The ships pass matches
//! store listings to vehicles by display name, then runs the variant-
//! inheritance pass for local rows that stayed dry. The paints pass walks
//! the paint SKUs and updates paint images. This syncer runs last by
//! design: where it resolves the same row as FleetYards, its URLs win
//! because non-empty incoming values overwrite.

use std::collections::{HashMap, HashSet};

use fleetdock_engine::{
    expand_rsi_paint_name, find_paint_match, inherit_variant_images, match_vehicle_name,
    ImageSet, MatchStats, VehicleNameSlug,
};
use tokio_util::sync::CancellationToken;

use crate::clients::rsi::{RsiApi, RsiResource, MAX_PAGE_LIMIT};
use crate::db::{self, Db};
use crate::error::Result;

use super::ensure_active;

const MEDIA_HOST: &str = "media.robertsspaceindustries.com";

pub(crate) async fn run(db: &Db, api: &dyn RsiApi, cancel: &CancellationToken) -> Result<i64> {
    let mut total = 0i64;

    total += sync_ship_images(db, api, cancel).await?;
    ensure_active(cancel)?;
    total += sync_paint_images(db, api, cancel).await?;

    Ok(total)
}

async fn sync_ship_images(db: &Db, api: &dyn RsiApi, cancel: &CancellationToken) -> Result<i64> {
    let locals = db::vehicles::get_all_vehicle_name_slugs(db).await?;
    if locals.is_empty() {
        tracing::warn!("vehicle table is empty, skipping rsi ship pass");
        return Ok(0);
    }

    let listings = collect_pages(api, BrowseKind::Ships, cancel).await?;

    let mut stats = MatchStats::default();
    let mut seen_images: HashMap<String, ImageSet> = HashMap::new();
    let mut touched: HashSet<String> = HashSet::new();

    for listing in &listings {
        let Some(name) = listing.display_name().filter(|n| !n.is_empty()) else {
            stats.skipped += 1;
            continue;
        };
        let images = match listing.image_url() {
            Some(url) => convert_store_image_url(url),
            None => ImageSet::default(),
        };
        if !images.is_empty() {
            seen_images.insert(name.to_lowercase(), images.clone());
        }

        match match_vehicle_name(name, &locals) {
            Some(hit) if !images.is_empty() => {
                db::vehicles::update_vehicle_images(db, &hit.slug, &images).await?;
                touched.insert(hit.slug.clone());
                stats.matched += 1;
            }
            _ => {
                tracing::debug!(name = %name, "no vehicle match for rsi listing");
                stats.skipped += 1;
            }
        }
    }

    let unmatched: Vec<VehicleNameSlug> = locals
        .iter()
        .filter(|v| !touched.contains(&v.slug))
        .cloned()
        .collect();
    for (vehicle, images) in inherit_variant_images(&unmatched, &seen_images) {
        db::vehicles::update_vehicle_images(db, &vehicle.slug, &images).await?;
        stats.inherited += 1;
    }

    tracing::info!(
        matched = stats.matched,
        inherited = stats.inherited,
        skipped = stats.skipped,
        "rsi ship images applied"
    );
    Ok(stats.total() as i64)
}

async fn sync_paint_images(db: &Db, api: &dyn RsiApi, cancel: &CancellationToken) -> Result<i64> {
    let stored = db::paints::get_all_paint_name_classes(db).await?;
    if stored.is_empty() {
        tracing::warn!("paint table is empty, skipping rsi paint pass");
        return Ok(0);
    }

    let skus = collect_pages(api, BrowseKind::PaintSkus, cancel).await?;
    let mut updated = 0i64;
    let mut misses = 0usize;

    for sku in &skus {
        if sku.is_package {
            continue;
        }
        let Some(title) = sku.display_name().filter(|t| !t.is_empty()) else {
            continue;
        };
        let images = match sku.image_url() {
            Some(url) => convert_store_image_url(url),
            None => continue,
        };
        if images.is_empty() {
            continue;
        }

        let expanded = expand_rsi_paint_name(title);
        match find_paint_match(&expanded, &stored) {
            Some(hit) => {
                updated +=
                    db::paints::update_paint_images(db, &hit.class_name, &images).await? as i64;
            }
            None => {
                tracing::debug!(title = %title, "no stored paint for rsi sku");
                misses += 1;
            }
        }
    }

    tracing::info!(updated, misses, "rsi paint images applied");
    Ok(updated)
}

#[derive(Clone, Copy)]
enum BrowseKind {
    Ships,
    PaintSkus,
}

/// Paginate a browse listing until the reported total is collected or a
/// page stops contributing. The no-progress guard protects against a
/// stale `totalCount` that would otherwise loop forever.
async fn collect_pages(
    api: &dyn RsiApi,
    kind: BrowseKind,
    cancel: &CancellationToken,
) -> Result<Vec<RsiResource>> {
    let mut collected = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut page = 1u32;

    loop {
        let batch = match kind {
            BrowseKind::Ships => api.browse_ships(page, MAX_PAGE_LIMIT, cancel).await?,
            BrowseKind::PaintSkus => api.browse_paint_skus(page, MAX_PAGE_LIMIT, cancel).await?,
        };
        if batch.resources.is_empty() {
            break;
        }

        let before = seen.len();
        for resource in batch.resources {
            let key = resource
                .id
                .clone()
                .or_else(|| resource.name.clone())
                .or_else(|| resource.title.clone())
                .unwrap_or_default();
            if seen.insert(key) {
                collected.push(resource);
            }
        }
        if seen.len() == before {
            tracing::warn!(page, "rsi page contributed nothing new, stopping pagination");
            break;
        }
        if collected.len() >= batch.total_count as usize {
            break;
        }
        page += 1;
    }

    Ok(collected)
}

/// Derive the four image sizes from a store media URL.
///
/// `https://media.robertsspaceindustries.com/<id>/source.jpg` yields the
/// `store_small` / `store_large` / `store_hub_large` variants for that
/// media id. Anything else is stored verbatim in all four columns.
/// Host-relative URLs are made absolute first.
fn convert_store_image_url(url: &str) -> ImageSet {
    let absolute = if url.starts_with('/') {
        format!("https://robertsspaceindustries.com{url}")
    } else {
        url.to_string()
    };

    if let Some(host_start) = absolute.find(MEDIA_HOST) {
        let prefix_end = host_start + MEDIA_HOST.len();
        let rest = absolute[prefix_end..].trim_start_matches('/');
        if let Some((media_id, _)) = rest.split_once('/') {
            if !media_id.is_empty() {
                let base = &absolute[..prefix_end];
                return ImageSet {
                    source: Some(absolute.clone()),
                    small: Some(format!("{base}/{media_id}/store_small.jpg")),
                    medium: Some(format!("{base}/{media_id}/store_large.jpg")),
                    large: Some(format!("{base}/{media_id}/store_hub_large.jpg")),
                };
            }
        }
    }
    ImageSet::uniform(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_urls_derive_variants() {
        let images = convert_store_image_url(
            "https://media.robertsspaceindustries.com/abc123/source.jpg",
        );
        assert_eq!(
            images.source.as_deref(),
            Some("https://media.robertsspaceindustries.com/abc123/source.jpg")
        );
        assert_eq!(
            images.small.as_deref(),
            Some("https://media.robertsspaceindustries.com/abc123/store_small.jpg")
        );
        assert_eq!(
            images.medium.as_deref(),
            Some("https://media.robertsspaceindustries.com/abc123/store_large.jpg")
        );
        assert_eq!(
            images.large.as_deref(),
            Some("https://media.robertsspaceindustries.com/abc123/store_hub_large.jpg")
        );
    }

    #[test]
    fn foreign_urls_fill_all_slots() {
        let images = convert_store_image_url("https://cdn.example.com/ship.png");
        assert_eq!(images.small.as_deref(), Some("https://cdn.example.com/ship.png"));
        assert_eq!(images.small, images.large);
    }

    #[test]
    fn relative_urls_become_absolute() {
        let images = convert_store_image_url("/media/thumb.jpg");
        assert_eq!(
            images.source.as_deref(),
            Some("https://robertsspaceindustries.com/media/thumb.jpg")
        );
    }
}

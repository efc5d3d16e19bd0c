//! FleetYards paint-image syncer.
//!
//! For every vehicle that has linked paints, asks FleetYards for that
//! model's paint listing and matches each entry against the stored paints
//! by normalized name. Runs after the Scunpacked syncer (the paint rows
//! must exist to be matched) and sleeps 500 ms between vehicles.

use std::time::Duration;

use fleetdock_engine::{find_paint_match, PaintNameClass};
use tokio_util::sync::CancellationToken;

use crate::clients::fleetyards::{image_set_from_media, FleetyardsApi};
use crate::clients::{sleep_cancellable, HttpError};
use crate::db::{self, Db};
use crate::error::{Error, Result};

const POLITENESS_SLEEP: Duration = Duration::from_millis(500);

pub(crate) async fn run(
    db: &Db,
    api: &dyn FleetyardsApi,
    cancel: &CancellationToken,
) -> Result<i64> {
    let slugs = db::paints::get_vehicle_slugs_with_paints(db).await?;
    if slugs.is_empty() {
        tracing::warn!("no vehicles with paints yet, skipping paint image sync");
        return Ok(0);
    }

    let mut updated = 0i64;
    let mut misses = 0usize;

    for (index, slug) in slugs.iter().enumerate() {
        if index > 0 {
            sleep_cancellable(cancel, POLITENESS_SLEEP).await?;
        }

        let stored: Vec<PaintNameClass> = db::paints::get_paints_by_vehicle_slug(db, slug)
            .await?
            .iter()
            .map(|p| p.to_name_class())
            .collect();

        let listing = match api.model_paints(slug, cancel).await {
            Ok(listing) => listing,
            Err(HttpError::Cancelled) => return Err(Error::DeadlineExceeded),
            Err(err) => {
                tracing::warn!(slug = %slug, error = %err, "fleetyards paint listing failed, skipping vehicle");
                continue;
            }
        };

        for fy_paint in listing {
            let images = image_set_from_media(fy_paint.media.as_ref());
            if images.is_empty() {
                continue;
            }
            match find_paint_match(&fy_paint.name, &stored) {
                Some(hit) => {
                    updated +=
                        db::paints::update_paint_images(db, &hit.class_name, &images).await? as i64;
                }
                None => {
                    tracing::debug!(slug = %slug, paint = %fy_paint.name, "no stored paint for fleetyards entry");
                    misses += 1;
                }
            }
        }
    }

    tracing::info!(updated, misses, "fleetyards paint images applied");
    Ok(updated)
}

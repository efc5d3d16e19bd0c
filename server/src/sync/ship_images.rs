//! FleetYards ship-image syncer.
//!
//! Walks the paginated model listing and writes image URLs onto vehicles
//! that already exist, matched by slug. Runs after the Wiki syncer and
//! short-circuits with a warning when the vehicle table is still empty.

use tokio_util::sync::CancellationToken;

use crate::clients::fleetyards::{image_set_from_media, FleetyardsApi};
use crate::db::{self, Db};
use crate::error::Result;

use super::ensure_active;

pub(crate) async fn run(
    db: &Db,
    api: &dyn FleetyardsApi,
    cancel: &CancellationToken,
) -> Result<i64> {
    if db::vehicles::count_vehicles(db).await? == 0 {
        tracing::warn!("vehicle table is empty, skipping ship image sync");
        return Ok(0);
    }

    let models = api.models(cancel).await?;
    let mut updated = 0i64;
    let mut skipped = 0usize;

    for model in models {
        ensure_active(cancel)?;
        let images = image_set_from_media(model.media.as_ref());
        if images.is_empty() {
            skipped += 1;
            continue;
        }
        match db::vehicles::update_vehicle_images(db, &model.slug, &images).await {
            Ok(0) => {
                tracing::debug!(slug = %model.slug, "no vehicle for fleetyards model");
                skipped += 1;
            }
            Ok(_) => updated += 1,
            Err(err) if db::is_constraint_violation(&err) => {
                tracing::warn!(slug = %model.slug, error = %err, "image update rejected, skipping");
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }

    tracing::info!(updated, skipped, "fleetyards ship images applied");
    Ok(updated)
}

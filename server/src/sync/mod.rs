//! The five source syncers and their orchestration.
//!
//! Every syncer follows one template: open a `sync_history` row in
//! `running` state, fetch, reconcile, upsert, then close the row with
//! `success` and a record count or `error` and a message. Individual row
//! failures (constraint violations, unmatchable records) are logged and
//! counted as skips; they never fail the run. Run-level failures fail the
//! run but never the pipeline.

pub mod pipeline;

mod paint_images;
mod paints;
mod rsi;
mod ship_images;
mod wiki;

pub use pipeline::{spawn_scheduler, PipelineClients, StageOutcome, SyncKind, SyncPipeline, SyncReport};

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::db::sync_history::{self, SyncSource, SyncStatus};
use crate::db::Db;
use crate::error::{Error, Result};

/// Run one syncer under its audit row.
///
/// Exactly one `sync_history` row is produced per invocation, opened
/// `running` and closed terminally. Cancellation-shaped failures are
/// folded into `context_deadline_exceeded` before being recorded.
pub(crate) async fn run_tracked<F, Fut>(
    db: &Db,
    source: SyncSource,
    endpoint: &str,
    task: F,
) -> Result<i64>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<i64>>,
{
    let history_id = sync_history::insert_sync_history(db, source, endpoint).await?;
    match task().await {
        Ok(count) => {
            sync_history::update_sync_history(db, history_id, SyncStatus::Success, count, None)
                .await?;
            tracing::info!(source = source.key(), endpoint, records = count, "sync completed");
            Ok(count)
        }
        Err(err) => {
            let err = err.normalize_cancellation();
            let message = err.to_string();
            sync_history::update_sync_history(
                db,
                history_id,
                SyncStatus::Error,
                0,
                Some(&message),
            )
            .await?;
            tracing::error!(source = source.key(), endpoint, error = %message, "sync failed");
            Err(err)
        }
    }
}

/// Bail out between stages once the run token has fired.
pub(crate) fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::DeadlineExceeded)
    } else {
        Ok(())
    }
}

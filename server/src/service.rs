//! The consumer surface an external HTTP façade calls into.
//!
//! Bundles the store, the pipeline, and the importer behind one handle:
//! manual sync triggers, hangar import, status, history, and the fleet
//! queries. Nothing here knows about HTTP.

use std::sync::Arc;

use serde::Serialize;

use crate::db::fleet::UserFleetView;
use crate::db::paints::PaintRow;
use crate::db::sync_history::SyncHistoryRow;
use crate::db::{self, Db};
use crate::error::Result;
use crate::hangar::{self, HangarEntry, ImportSummary};
use crate::sync::{SyncKind, SyncPipeline, SyncReport};

/// Default page size for [`FleetService::list_sync_history`].
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Reference-table counts plus the latest run per source.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub manufacturers: i64,
    pub vehicles: i64,
    pub paints: i64,
    pub latest_syncs: Vec<SyncHistoryRow>,
}

/// The core service handle.
#[derive(Clone)]
pub struct FleetService {
    db: Db,
    pipeline: Arc<SyncPipeline>,
}

impl FleetService {
    pub fn new(db: Db, pipeline: Arc<SyncPipeline>) -> Self {
        Self { db, pipeline }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Run the Wiki syncer now. Fails fast when a sync is running.
    pub async fn trigger_scwiki_sync(&self) -> Result<SyncReport> {
        self.pipeline.run(SyncKind::Wiki).await
    }

    /// Run the FleetYards ship-image syncer now.
    pub async fn trigger_image_sync(&self) -> Result<SyncReport> {
        self.pipeline.run(SyncKind::ShipImages).await
    }

    /// Run the paint chain now: Scunpacked metadata, then FleetYards
    /// paint images.
    pub async fn trigger_paint_sync(&self) -> Result<SyncReport> {
        self.pipeline.run(SyncKind::PaintChain).await
    }

    /// Run the RSI syncer now.
    pub async fn trigger_rsi_sync(&self) -> Result<SyncReport> {
        self.pipeline.run(SyncKind::Rsi).await
    }

    /// Run the whole chain now, in pipeline order.
    pub async fn trigger_full_sync(&self) -> Result<SyncReport> {
        self.pipeline.run(SyncKind::Full).await
    }

    /// Import a hangar dump, replacing the user's fleet atomically.
    pub async fn import_hangar(
        &self,
        user_id: i64,
        entries: Vec<HangarEntry>,
    ) -> Result<ImportSummary> {
        hangar::import_hangar(&self.db, user_id, entries).await
    }

    /// Reference counts and the latest run per source.
    pub async fn get_status(&self) -> Result<ServiceStatus> {
        Ok(ServiceStatus {
            manufacturers: db::manufacturers::count_manufacturers(&self.db).await?,
            vehicles: db::vehicles::count_vehicles(&self.db).await?,
            paints: db::paints::count_paints(&self.db).await?,
            latest_syncs: db::sync_history::latest_sync_per_source(&self.db).await?,
        })
    }

    /// The most recent sync runs, newest first.
    pub async fn list_sync_history(&self, limit: Option<i64>) -> Result<Vec<SyncHistoryRow>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(1);
        Ok(db::sync_history::list_sync_history(&self.db, limit).await?)
    }

    /// The user's fleet with all reference JOINs applied.
    pub async fn list_user_fleet(&self, user_id: i64) -> Result<Vec<UserFleetView>> {
        Ok(db::fleet::list_user_fleet(&self.db, user_id).await?)
    }

    /// Paints linked to one vehicle.
    pub async fn get_paints_by_vehicle_slug(&self, slug: &str) -> Result<Vec<PaintRow>> {
        Ok(db::paints::get_paints_by_vehicle_slug(&self.db, slug).await?)
    }
}

//! Pipeline orchestration: ordering, single-flight, deadline, cron.
//!
//! Stage order is a correctness requirement, not a preference: the Wiki
//! syncer creates the rows every image source updates, Scunpacked creates
//! the paint rows FleetYards matches, and RSI runs last so its image URLs
//! win. A process-wide try-lock guard keeps at most one sync of any kind
//! in flight; concurrent triggers fail fast with `sync_in_progress`. Each
//! run gets a cancellation token fired by a 30-minute deadline.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::clients::{FleetyardsApi, RsiApi, ScunpackedApi, WikiApi};
use crate::config::Config;
use crate::db::sync_history::{SyncSource, SyncStatus};
use crate::db::{self, Db};
use crate::error::{Error, Result};

use super::{paint_images, paints, rsi, run_tracked, ship_images, wiki};

/// Wall-clock budget for one run, whatever its scope.
const RUN_BUDGET: Duration = Duration::from_secs(30 * 60);

/// The upstream clients the pipeline drives, as trait objects so tests
/// can substitute fakes.
#[derive(Clone)]
pub struct PipelineClients {
    pub wiki: Arc<dyn WikiApi>,
    pub fleetyards: Arc<dyn FleetyardsApi>,
    pub scunpacked: Arc<dyn ScunpackedApi>,
    pub rsi: Arc<dyn RsiApi>,
}

/// What a run should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// All five stages in order.
    Full,
    /// Everything except the Wiki stage, for warm starts.
    Refresh,
    Wiki,
    ShipImages,
    /// Scunpacked metadata followed by FleetYards paint images.
    PaintChain,
    Paints,
    PaintImages,
    Rsi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Wiki,
    ShipImages,
    Paints,
    PaintImages,
    Rsi,
}

/// Stage kinds in cron slot order, one per schedule entry.
const CRON_KINDS: [SyncKind; 5] = [
    SyncKind::Wiki,
    SyncKind::ShipImages,
    SyncKind::Paints,
    SyncKind::PaintImages,
    SyncKind::Rsi,
];

fn stages_for(kind: SyncKind) -> &'static [Stage] {
    match kind {
        SyncKind::Full => &[
            Stage::Wiki,
            Stage::ShipImages,
            Stage::Paints,
            Stage::PaintImages,
            Stage::Rsi,
        ],
        SyncKind::Refresh => &[
            Stage::ShipImages,
            Stage::Paints,
            Stage::PaintImages,
            Stage::Rsi,
        ],
        SyncKind::Wiki => &[Stage::Wiki],
        SyncKind::ShipImages => &[Stage::ShipImages],
        SyncKind::PaintChain => &[Stage::Paints, Stage::PaintImages],
        SyncKind::Paints => &[Stage::Paints],
        SyncKind::PaintImages => &[Stage::PaintImages],
        SyncKind::Rsi => &[Stage::Rsi],
    }
}

/// Outcome of one stage within a run.
#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub source: SyncSource,
    pub endpoint: &'static str,
    pub status: SyncStatus,
    pub records: i64,
    pub error: Option<String>,
}

/// Everything a run did, stage by stage.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub stages: Vec<StageOutcome>,
}

/// The sync orchestrator. One per process.
pub struct SyncPipeline {
    db: Db,
    config: Arc<Config>,
    clients: PipelineClients,
    guard: tokio::sync::Mutex<()>,
}

impl SyncPipeline {
    pub fn new(db: Db, config: Arc<Config>, clients: PipelineClients) -> Self {
        Self {
            db,
            config,
            clients,
            guard: tokio::sync::Mutex::new(()),
        }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Run the stages for `kind` under the single-flight guard.
    ///
    /// Returns [`Error::SyncInProgress`] immediately when another run
    /// holds the guard. Stage failures are recorded in the report and do
    /// not halt later stages.
    pub async fn run(&self, kind: SyncKind) -> Result<SyncReport> {
        let _guard = self.guard.try_lock().map_err(|_| Error::SyncInProgress)?;

        let cancel = CancellationToken::new();
        let deadline = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(RUN_BUDGET).await;
                cancel.cancel();
            })
        };

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync_run", %run_id, ?kind);
        let report = self.run_stages(kind, &cancel).instrument(span).await;
        deadline.abort();
        report
    }

    async fn run_stages(&self, kind: SyncKind, cancel: &CancellationToken) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for &stage in stages_for(kind) {
            if cancel.is_cancelled() {
                tracing::warn!(?stage, "run budget exhausted before stage started");
                break;
            }
            match stage {
                Stage::Wiki if !self.config.sc_wiki.enabled => {
                    tracing::info!("wiki source disabled, skipping stage");
                    continue;
                }
                Stage::Rsi if !self.config.rsi.enabled => {
                    tracing::info!("rsi source disabled, skipping stage");
                    continue;
                }
                _ => {}
            }

            let (source, endpoint, result) = self.run_stage(stage, cancel).await;
            match result {
                Ok(records) => report.stages.push(StageOutcome {
                    source,
                    endpoint,
                    status: SyncStatus::Success,
                    records,
                    error: None,
                }),
                Err(err) => {
                    // the stage recorded its own error row; the chain goes on
                    report.stages.push(StageOutcome {
                        source,
                        endpoint,
                        status: SyncStatus::Error,
                        records: 0,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn run_stage(
        &self,
        stage: Stage,
        cancel: &CancellationToken,
    ) -> (SyncSource, &'static str, Result<i64>) {
        let db = &self.db;
        match stage {
            Stage::Wiki => (
                SyncSource::ScWiki,
                "vehicles+items",
                run_tracked(db, SyncSource::ScWiki, "vehicles+items", || {
                    wiki::run(db, self.clients.wiki.as_ref(), cancel)
                })
                .await,
            ),
            Stage::ShipImages => (
                SyncSource::Fleetyards,
                "models",
                run_tracked(db, SyncSource::Fleetyards, "models", || {
                    ship_images::run(db, self.clients.fleetyards.as_ref(), cancel)
                })
                .await,
            ),
            Stage::Paints => (
                SyncSource::Scunpacked,
                "items",
                run_tracked(db, SyncSource::Scunpacked, "items", || {
                    paints::run(db, self.clients.scunpacked.as_ref(), cancel)
                })
                .await,
            ),
            Stage::PaintImages => (
                SyncSource::Fleetyards,
                "models/*/paints",
                run_tracked(db, SyncSource::Fleetyards, "models/*/paints", || {
                    paint_images::run(db, self.clients.fleetyards.as_ref(), cancel)
                })
                .await,
            ),
            Stage::Rsi => (
                SyncSource::RsiApi,
                "graphql",
                run_tracked(db, SyncSource::RsiApi, "graphql", || {
                    rsi::run(db, self.clients.rsi.as_ref(), cancel)
                })
                .await,
            ),
        }
    }

    /// Boot-time sync. A cold database (no manufacturers) gets the full
    /// chain; a warm one skips the Wiki stage.
    pub async fn startup_sync(&self) -> Result<Option<SyncReport>> {
        if !self.config.sync_on_startup {
            return Ok(None);
        }
        let kind = if db::manufacturers::count_manufacturers(&self.db).await? == 0 {
            SyncKind::Full
        } else {
            SyncKind::Refresh
        };
        tracing::info!(?kind, "running startup sync");
        match self.run(kind).await {
            Ok(report) => Ok(Some(report)),
            Err(Error::SyncInProgress) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Register the five staggered cron jobs and start the scheduler.
///
/// Schedule slots map one-to-one onto sources in pipeline order. The
/// single-flight guard makes overlapping firings safe: a job that finds
/// a sync already running logs and yields.
pub async fn spawn_scheduler(pipeline: Arc<SyncPipeline>) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    for (expression, kind) in pipeline.config.sync_schedule.iter().zip(CRON_KINDS) {
        let pipeline = pipeline.clone();
        let job = Job::new_async(expression.as_str(), move |_job_id, _scheduler| {
            let pipeline = pipeline.clone();
            Box::pin(async move {
                match pipeline.run(kind).await {
                    Ok(report) => {
                        tracing::info!(?kind, stages = report.stages.len(), "scheduled sync finished");
                    }
                    Err(Error::SyncInProgress) => {
                        tracing::warn!(?kind, "scheduled sync skipped, another sync is running");
                    }
                    Err(err) => {
                        tracing::error!(?kind, error = %err, "scheduled sync failed");
                    }
                }
            })
        })?;
        scheduler.add(job).await?;
    }

    scheduler.start().await?;
    Ok(scheduler)
}

//! Fleetdock daemon: boots the store, runs the optional startup sync,
//! and keeps the staggered cron schedule alive until shutdown.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleetdock_server::clients::{FleetyardsClient, RsiClient, ScunpackedClient, WikiClient};
use fleetdock_server::config::Config;
use fleetdock_server::sync::{spawn_scheduler, PipelineClients, SyncPipeline};
use fleetdock_server::{db, FleetService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetdock_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env()?);

    tracing::info!("Starting Fleetdock sync service");

    let db = db::connect(&config.database_url).await?;
    db::schema::ensure_schema(&db).await?;
    let user_id = db::users::ensure_default_user(&db).await?;
    tracing::debug!(user_id, "default user ready");

    let clients = PipelineClients {
        wiki: Arc::new(WikiClient::new(&config.sc_wiki)?),
        fleetyards: Arc::new(FleetyardsClient::new(&config.fleetyards_base_url)?),
        scunpacked: Arc::new(ScunpackedClient::new(&config.scunpacked)?),
        rsi: Arc::new(RsiClient::new(&config.rsi)?),
    };
    let pipeline = Arc::new(SyncPipeline::new(db.clone(), config.clone(), clients));
    let service = FleetService::new(db, pipeline.clone());

    if let Some(report) = pipeline.startup_sync().await? {
        tracing::info!(stages = report.stages.len(), "startup sync finished");
    }

    let mut scheduler = spawn_scheduler(pipeline).await?;
    let status = service.get_status().await?;
    tracing::info!(
        manufacturers = status.manufacturers,
        vehicles = status.vehicles,
        paints = status.paints,
        "scheduler running"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    scheduler.shutdown().await?;

    Ok(())
}

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use timeclock_api::app::{create_app, AppState, Services};
use timeclock_api::config::Config;
use timeclock_api::jobs::{AutoCloseSessionsJob, JobScheduler, PoolMetricsJob};
use timeclock_api::middleware::{init_metrics, logging::init_logging};

/// How long background jobs get to finish after a shutdown signal.
const JOB_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to install metrics recorder")?;

    info!("Starting Timeclock API v{}", env!("CARGO_PKG_VERSION"));

    let db_config = persistence::db::DatabaseConfig::from(&config.database);
    let pool = persistence::db::create_pool(&db_config).await?;
    persistence::db::run_migrations(&pool).await?;

    let services = Services::postgres(pool.clone(), &config)?;
    let addr = config.socket_addr()?;
    let reaper_interval = config.attendance.reaper_interval_minutes;
    let state = AppState::new(config, services);

    let mut scheduler = JobScheduler::new();
    scheduler.register(AutoCloseSessionsJob::new(state.reaper.clone(), reaper_interval));
    scheduler.register(PoolMetricsJob::new(pool));
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(JOB_SHUTDOWN_TIMEOUT).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

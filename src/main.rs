//! Ultrahuman Poller — Entry Point
//!
//! Initializes configuration, logging, and the two adapters, then runs
//! the poll loop until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml (path from POLLER_CONFIG) + env overrides + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Load API credential from API_TOKEN
//! 4. Create UltrahumanClient (MetricsSource port)
//! 5. Create InfluxWriter or DryRunSink (PointSink port)
//! 6. Spawn the Poller loop
//! 7. Wait for SIGINT/SIGTERM → broadcast shutdown → let the current cycle finish

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use ultrahuman_poller::adapters::api::{ApiCredential, UltrahumanClient, UltrahumanClientConfig};
use ultrahuman_poller::adapters::store::{DryRunSink, InfluxWriter, Series};
use ultrahuman_poller::config::{self, AppConfig};
use ultrahuman_poller::ports::{MetricsSource, PointSink};
use ultrahuman_poller::usecases::{Poller, PollerSettings};

/// How long a cycle in flight may take to finish after shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::var(config::loader::CONFIG_PATH_ENV)
        .unwrap_or_else(|_| config::loader::DEFAULT_CONFIG_PATH.to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.poller.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.poller.name,
        version = env!("CARGO_PKG_VERSION"),
        config_file = %config_path,
        config_file_found = Path::new(&config_path).exists(),
        dry_run = config.poller.dry_run,
        "Starting Ultrahuman poller"
    );

    // ── 3. Load API credential ──────────────────────────────
    let credential = ApiCredential::from_env().context("Failed to load API credential")?;

    // ── 4. Metrics source ───────────────────────────────────
    let client = UltrahumanClient::new(&credential, UltrahumanClientConfig::from(&config.api))
        .context("Failed to create Ultrahuman client")?;
    info!(url = %client.url(), "Metrics source ready");
    let source: Arc<dyn MetricsSource> = Arc::new(client);

    // ── 5. Point sink ───────────────────────────────────────
    let sink = build_sink(&config)?;

    // ── 6. Spawn poller ─────────────────────────────────────
    let settings = PollerSettings {
        interval: config.poller.interval(),
        timezone: config
            .poller
            .timezone_policy()
            .context("Invalid poller.timezone")?,
        lookback_days: config.poller.lookback_days,
    };
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let mut poller = Poller::new(source, sink, settings);
    let poller_handle = tokio::spawn(async move {
        if let Err(e) = poller.run(shutdown_rx).await {
            error!(error = %e, "Poller loop failed");
        }
    });

    // ── 7. Wait for SIGINT or SIGTERM ───────────────────────
    wait_for_shutdown_signal().await;

    let _ = shutdown_tx.send(());
    if tokio::time::timeout(SHUTDOWN_GRACE, poller_handle).await.is_err() {
        warn!("Poll cycle still running after grace period, exiting anyway");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Pick the InfluxDB writer, or the dry-run sink when writes are off.
fn build_sink(config: &AppConfig) -> Result<Arc<dyn PointSink>> {
    match &config.influx {
        Some(influx) if !config.poller.dry_run => {
            let token = InfluxWriter::token_from_env();
            if token.is_none() {
                warn!("INFLUX_TOKEN not set, writing without authentication");
            }
            let writer = InfluxWriter::new(influx, token.as_deref())
                .context("Failed to create InfluxDB writer")?;
            info!(url = %influx.url, org = %influx.org, bucket = %writer.bucket(), "InfluxDB storage enabled");
            Ok(Arc::new(writer))
        }
        Some(influx) => {
            warn!("Dry-run mode, points are logged but NOT written");
            Ok(Arc::new(DryRunSink::new(Series::new(
                influx.measurement.clone(),
                influx.tags.clone(),
            ))))
        }
        None => {
            warn!("InfluxDB not configured, points are logged but NOT written");
            let defaults = config::InfluxConfig::default();
            Ok(Arc::new(DryRunSink::new(Series::new(
                defaults.measurement,
                defaults.tags,
            ))))
        }
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix (container stop).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("SIGINT received, initiating graceful shutdown"),
                    _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Cannot listen for SIGTERM, only SIGINT stops the poller"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for SIGINT");
        std::future::pending::<()>().await;
    }
    info!("SIGINT received, initiating graceful shutdown");
}

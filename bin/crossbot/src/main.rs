use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::Config;
use engine::{
    load_instruments, MonitorDeps, MonitorSettings, StatusFile, Supervisor, SystemClock,
    TwelveDataClient,
};
use telegram_notify::TelegramNotifier;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::load().context("failed to resolve configuration")?;
    info!(timezone = %cfg.timezone, port = cfg.port, "Crossbot starting");

    // ── Instruments ───────────────────────────────────────────────────────────
    let instruments = load_instruments(&cfg.assets_path).context("failed to load instruments")?;

    // ── Collaborators ─────────────────────────────────────────────────────────
    let quotes = TwelveDataClient::new(&cfg.quote_base_url, cfg.api_key.clone(), cfg.http_timeout)
        .context("failed to build quote client")?;
    let deps = MonitorDeps {
        quotes: Arc::new(quotes),
        notifier: Arc::new(TelegramNotifier::new(cfg.telegram_token.clone(), cfg.telegram_chat_id)),
        flag: Arc::new(StatusFile::new(&cfg.status_path)),
        clock: Arc::new(SystemClock),
    };

    // ── Monitors ──────────────────────────────────────────────────────────────
    let supervisor = Supervisor::new(deps, MonitorSettings::default(), cfg.timezone);
    let _monitors = supervisor.spawn(&instruments);

    // ── Liveness endpoint (keeps the process resident) ────────────────────────
    api::serve(cfg.port, shutdown_signal())
        .await
        .context("liveness endpoint failed")?;

    info!("Shutdown signal received. Exiting.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}

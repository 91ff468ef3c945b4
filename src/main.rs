use telemetry_charts::config::Config;
use telemetry_charts::server::dashboard::Dashboard;
use telemetry_charts::server::db::DatabaseCtx;
use telemetry_charts::server::{playback, routes, AppState};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Live telemetry charts for the simulation dashboard.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML config file; built-in defaults are used if it doesn't exist.
    #[arg(short, long, default_value = "dashboard.toml")]
    config: PathBuf,

    /// Overrides `server.bind`.
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Overrides `storage.db_path`.
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(database) = cli.database {
        config.storage.db_path = database;
    }

    if let Some(dir) = config.storage.db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let db = DatabaseCtx::open(&config.storage.db_path)
        .with_context(|| format!("opening {}", config.storage.db_path.display()))?;

    let mut dashboard = Dashboard::new(&config.charts, &config.playback).context("building dashboard")?;

    // Pick up where the last run left off.
    let restored = dashboard.restore(&db).context("restoring datasets")?;
    info!(samples = restored, "restore complete");

    let state = AppState::new(dashboard, db);
    tokio::spawn(playback::run(state.clone(), Duration::from_millis(config.playback.tick_ms.max(1))));

    let app = routes::router(state);
    let addr = config.server.bind;

    info!(%addr, charts = config.charts.len(), "listening");

    axum_server::Server::bind(addr)
        .serve(app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod config;
mod routes;

use config::ServerConfig;
use routes::AppState;

#[derive(Parser)]
#[command(name = "fleetmap-server")]
#[command(about = "Live topology directory for media ingest and transcode fleets")]
#[command(version)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "fleetmap.json")]
    config: PathBuf,

    /// Override the configured listen address
    #[arg(long)]
    listen: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = ServerConfig::load(&cli.config)?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("could not bind {listen_addr}"))?;
    log::info!("fleetmap server listening on {listen_addr}");

    axum::serve(listener, routes::router(state))
        .await
        .context("server terminated")?;
    Ok(())
}

//! Fragwatch - live Quake 3 Arena log watcher
//!
//! Follows a growing game server log and keeps a running scoreboard:
//! - per-player kills, deaths, weapon stats and streaks per round
//! - frag-limit-relative scoring with beer/cider display units
//! - rank tracking across rounds with a terminal scoreboard

mod config;
mod game;
mod parser;
mod render;
mod tail;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::game::Session;

#[derive(Debug, Parser)]
#[command(
    name = "fragwatch",
    about = "Real-time Quake 3 Arena game statistics tracker",
    long_about = "Fragwatch monitors a Quake 3 Arena server log and displays live player\n\
                  statistics, rankings and match information in your terminal, with a\n\
                  beer/cider scoring system for match performance."
)]
struct Args {
    /// Path to the Quake 3 game log file
    #[arg(short, long)]
    filename: PathBuf,

    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Log state transitions instead of drawing the scoreboard
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.debug);

    if !args.filename.exists() {
        anyhow::bail!("file does not exist: {}", args.filename.display());
    }

    let config = Config::load(&args.config)?;
    info!(config = %args.config.display(), "configuration loaded");

    let session = Session::new(Arc::new(config));
    let (updates_tx, updates_rx) = watch::channel(session.snapshot());

    if args.debug {
        // Debug mode: no scoreboard, tracing output only
        drop(updates_rx);
    } else {
        tokio::spawn(render::run(updates_rx));
    }

    tokio::select! {
        result = tail::follow(&args.filename, session, updates_tx) => result?,
        _ = shutdown_signal() => {
            info!("shutting down");
        }
    }

    Ok(())
}

/// Initialize tracing/logging. While the scoreboard is drawing, only
/// warnings and errors get through so the table stays readable.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

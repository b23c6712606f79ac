//! PuzzleBridge console client
//!
//! Plays the puzzle game against its HTTP backend from a terminal. The player
//! id and cached progress persist between runs.
//!
//! Usage:
//!   puzzlebridge puzzles
//!   puzzlebridge answer riddle "cat"
//!   puzzlebridge --api-base-url http://game.local/api info

use anyhow::{Context, Result};
use clap::Parser;
use puzzlebridge_cli::{App, Command, ConsoleView};
use puzzlebridge_game::GameConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "puzzlebridge")]
#[command(about = "Play PuzzleBridge puzzles from the terminal")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long, env = "PUZZLEBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, env = "PUZZLEBRIDGE_API")]
    api_base_url: Option<String>,

    /// Directory for persisted player state
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory holding embedded puzzle fragments
    #[arg(long, default_value = ".")]
    content_dir: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path).context("Failed to load config")?,
        None => GameConfig::default(),
    };
    if let Some(url) = args.api_base_url {
        config.http.base_url = url;
    }
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir;
    }
    info!("Using backend {}", config.http.base_url);

    let mut app = App::new(&config, args.content_dir, Arc::new(ConsoleView::stdout()))?;
    app.run(args.command).await
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{Config, ServerOverrides};
use database::{ConnectionManager, DbRepository};
use std::path::PathBuf;
use std::sync::Arc;
use web_server::AppState;

/// The main entry point for the Reelboard catalog service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => configuration::load_config_from(path),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;

    // Held for the whole run so buffered file logs are flushed on exit.
    let _guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => {
            args.server.apply(&mut config.server);
            handle_serve(config).await
        }
        Commands::Ping => handle_ping(config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Movie catalog and leaderboard API backed by MongoDB.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file (defaults to `config.toml` if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the database and serve the HTTP API.
    Serve(ServeArgs),
    /// Check that the configured database is reachable, then exit.
    Ping,
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    server: ServerOverrides,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let manager = ConnectionManager::new(config.database.clone());
    let db = manager
        .connect()
        .await
        .context("Failed to connect to the database")?;

    let state = AppState::new(Arc::new(DbRepository::new(db)));
    web_server::run_server(&config.server, state).await
}

async fn handle_ping(config: Config) -> anyhow::Result<()> {
    let manager = ConnectionManager::new(config.database.clone());
    manager
        .connect()
        .await
        .with_context(|| format!("Database '{}' is unreachable", config.database.name))?;

    tracing::info!(database = %config.database.name, "Database is reachable.");
    println!("ok");
    Ok(())
}

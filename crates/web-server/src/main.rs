use anyhow::Context;
use database::{ConnectionManager, DbRepository};
use std::sync::Arc;
use web_server::AppState;

// This main function is the entry point when running `cargo run -p web-server`.
// It serves with settings from `config.toml` and the environment; the root
// `reelboard` binary adds CLI overrides on top.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = configuration::load_config().context("Failed to load configuration")?;
    let _guard = configuration::init_tracing(&config.logging)?;

    let manager = ConnectionManager::new(config.database.clone());
    let db = manager
        .connect()
        .await
        .context("Failed to connect to the database")?;
    let state = AppState::new(Arc::new(DbRepository::new(db)));

    web_server::run_server(&config.server, state).await
}

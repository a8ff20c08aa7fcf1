use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use settings::ServerOverrides;
pub use settings::{Config, DatabaseSettings, LoggingSettings, ServerSettings};
pub use telemetry::init_tracing;

/// Default location of the settings file, relative to the working directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `REELBOARD__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "REELBOARD";

/// Loads the application configuration.
///
/// Sources, lowest precedence first: built-in defaults, the optional
/// `config.toml`, `REELBOARD__*` environment variables, and finally
/// `DATABASE_URL` (also read from `.env`) for the connection string.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    load(Path::new(CONFIG_FILE), false, true)
}

/// Same as [`load_config`] but reads settings from an explicit file path,
/// which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    load(path, true, true)
}

fn load(path: &Path, file_required: bool, with_environment: bool) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.uri", "mongodb://localhost:27017")?
        .set_default("database.name", "reelboard")?
        .set_default("database.connect_timeout_secs", 5)?
        .set_default("database.server_selection_timeout_secs", 5)?
        .set_default("logging.level", "info")?
        .add_source(config::File::from(path).required(file_required));

    if with_environment {
        builder = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.uri", std::env::var("DATABASE_URL").ok())?;
    }

    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

use crate::error::DbError;
use configuration::DatabaseSettings;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tokio::sync::OnceCell;

const APP_NAME: &str = "reelboard";

/// Owns the process's database handle.
///
/// `connect` may be called any number of times: the first successful
/// attempt is memoized and every later call gets a clone of the same
/// `Database` (the driver pools connections internally, so clones are
/// cheap). A failed attempt leaves the manager empty so the next call tries
/// again. The manager is built once at startup and passed to whoever needs
/// it; there is no process-global handle.
pub struct ConnectionManager {
    settings: DatabaseSettings,
    database: OnceCell<Database>,
}

impl ConnectionManager {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            settings,
            database: OnceCell::new(),
        }
    }

    /// Returns the live database handle, establishing it on first use.
    pub async fn connect(&self) -> Result<Database, DbError> {
        self.connect_with(establish).await
    }

    /// Memoizes whatever `establish` produces on its first success.
    async fn connect_with<'a, F, Fut>(&'a self, establish: F) -> Result<Database, DbError>
    where
        F: FnOnce(&'a DatabaseSettings) -> Fut,
        Fut: Future<Output = Result<Database, DbError>> + 'a,
    {
        self.database
            .get_or_try_init(|| establish(&self.settings))
            .await
            .cloned()
    }
}

/// Parses the URI, builds a client and pings the server.
async fn establish(settings: &DatabaseSettings) -> Result<Database, DbError> {
    let mut options = ClientOptions::parse(&settings.uri)
        .await
        .map_err(DbError::Connection)?;
    options.app_name = Some(APP_NAME.to_string());
    options.connect_timeout = Some(settings.connect_timeout());
    options.server_selection_timeout = Some(settings.server_selection_timeout());

    let client = Client::with_options(options).map_err(DbError::Connection)?;
    let database = client.database(&settings.name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(DbError::Connection)?;

    tracing::info!(database = %settings.name, "Connected to MongoDB.");
    Ok(database)
}

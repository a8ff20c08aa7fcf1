use axum::{Router, extract::DefaultBodyLimit, routing::get};
use configuration::ServerSettings;
use database::CatalogStore;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod admin;
pub mod error;
pub mod handlers;
pub mod response;

/// Largest request body the admin routes accept.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }
}

/// Builds the full application router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/movieseries/search", get(handlers::search_movies))
        .route(
            "/api/movieseries/static-params",
            get(handlers::get_static_params),
        )
        .route("/api/movieseries/:id", get(handlers::get_movie))
        .route("/api/users/leaderboard", get(handlers::get_leaderboard))
        .nest("/api/admin", admin::routes())
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
}

/// Binds the listener and serves until the process is stopped.
///
/// Tracing is expected to be initialised by the caller.
pub async fn run_server(settings: &ServerSettings, state: Arc<AppState>) -> anyhow::Result<()> {
    let address = settings.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Web server listening on http://{}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal.");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down.");
}

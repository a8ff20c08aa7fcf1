use crate::{AppState, error::AppError, response::ApiResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use core_types::{LeaderboardEntry, PlainMovie, PlainMovieTitle};
use database::{MovieLookup, lookup_movie};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum number of hits returned by the title search.
pub const SEARCH_LIMIT: i64 = 5;
/// Number of users shown on the leaderboard.
pub const LEADERBOARD_LIMIT: i64 = 10;
/// Number of movie pages pre-generated at build time.
pub const STATIC_PARAMS_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StaticParam {
    pub id: String,
}

/// # GET /api/movieseries/search?query=
/// Case-insensitive title search, at most five `{_id, title}` hits.
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<Vec<PlainMovieTitle>>>, AppError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Query parameter is required".to_string()))?;

    let hits = state.store.search_movie_titles(query, SEARCH_LIMIT).await?;
    tracing::info!(count = hits.len(), query, "Movie search completed.");

    Ok(ApiResponse::ok(
        hits.iter().map(PlainMovieTitle::from).collect(),
    ))
}

/// # GET /api/users/leaderboard
/// The top ten users by `monthlyXP`.
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>, AppError> {
    let entries = state.store.top_users(LEADERBOARD_LIMIT).await?;
    Ok(ApiResponse::ok(entries))
}

/// # GET /api/movieseries/:id
/// A missing movie is not an error: it answers `data: null` with 200.
pub async fn get_movie(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Option<PlainMovie>>>, AppError> {
    match lookup_movie(state.store.as_ref(), &id).await {
        MovieLookup::Found(movie) => Ok(ApiResponse::ok(Some(PlainMovie::from(&movie)))),
        MovieLookup::NotFound => Ok(ApiResponse::ok(None)),
        MovieLookup::BackendError(e) => Err(e.into()),
    }
}

/// # GET /api/movieseries/static-params
/// Identifiers of up to twenty active movies for page pre-generation.
pub async fn get_static_params(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<StaticParam>>>, AppError> {
    let ids = state.store.active_movie_ids(STATIC_PARAMS_LIMIT).await?;
    Ok(ApiResponse::ok(
        ids.into_iter()
            .map(|id| StaticParam { id: id.to_hex() })
            .collect(),
    ))
}

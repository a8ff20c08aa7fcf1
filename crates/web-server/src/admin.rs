//! Back-office routes, mounted under `/api/admin`.
//!
//! Access control sits in front of these routes and is not handled here.
//! Deleting anything is a soft delete through `CatalogStore::deactivate`.

use crate::{AppState, error::AppError, response::ApiResponse};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use core_types::{
    CastMaster, EarningByCountry, LeaderboardEntry, MovieSeries, ObjectId, PlainActorEarning,
    PlainCast, PlainCountryEarning, PlainMovie, Rating, Status, TopActorEarning, User,
};
use database::{CollectionKind, EarningsSummary};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_EARNINGS_LIMIT: i64 = 10;
const MAX_EARNINGS_LIMIT: i64 = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movieseries", get(list_movies).post(create_movie))
        .route("/movieseries/:id", put(update_movie).delete(deactivate_movie))
        .route("/movieseries/:id/ratings", post(add_rating))
        .route("/movieseries/:id/earnings", get(get_earnings_summary))
        .route("/cast", get(list_cast).post(create_cast))
        .route("/cast/:id", put(update_cast).delete(deactivate_cast))
        .route(
            "/earnings/countries",
            get(list_country_earnings).post(create_country_earning),
        )
        .route("/earnings/countries/:id", delete(deactivate_country_earning))
        .route(
            "/earnings/actors",
            get(list_actor_earnings).post(create_actor_earning),
        )
        .route("/earnings/actors/:id", delete(deactivate_actor_earning))
        .route("/users", post(create_user))
}

// ==============================================================================
// Request payloads
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsParams {
    pub movie_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePayload {
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub status: Option<Status>,
}

impl MoviePayload {
    fn apply_to(self, movie: &mut MovieSeries) {
        movie.title = self.title;
        movie.description = self.description;
        movie.release_year = self.release_year;
        movie.poster_url = self.poster_url;
        if let Some(status) = self.status {
            movie.status = status;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RatingPayload {
    pub source: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastPayload {
    pub cast_name: String,
    pub cast_type: String,
    pub image_url: Option<String>,
    pub expected_earning: Decimal,
    pub status: Option<Status>,
}

impl CastPayload {
    /// Writes the editable fields over `cast`. An omitted `status` keeps the
    /// current one.
    fn apply_to(self, cast: &mut CastMaster) {
        cast.cast_name = self.cast_name;
        cast.cast_type = self.cast_type;
        cast.image_url = self.image_url;
        cast.expected_earning = self.expected_earning;
        if let Some(status) = self.status {
            cast.status = status;
        }
    }
}

impl From<CastPayload> for CastMaster {
    fn from(payload: CastPayload) -> Self {
        let mut cast = CastMaster::new(String::new(), String::new(), Decimal::ZERO);
        payload.apply_to(&mut cast);
        cast
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryEarningPayload {
    pub movie_id: String,
    pub country_id: String,
    pub payment: Decimal,
    pub status: Option<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorEarningPayload {
    pub movie_id: String,
    pub actor_id: String,
    pub payment: Decimal,
    pub status: Option<Status>,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub username: String,
    #[serde(rename = "monthlyXP", default)]
    pub monthly_xp: i64,
}

#[derive(Debug, Serialize)]
pub struct Deactivated {
    pub id: String,
    pub status: Status,
}

// ==============================================================================
// Helpers
// ==============================================================================

fn parse_status(raw: Option<&str>) -> Result<Option<Status>, AppError> {
    raw.map(|s| s.parse::<Status>())
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// An id in the request body must be well formed.
fn body_object_id(field: &str, raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::Validation(format!("{field} is not a valid identifier")))
}

/// An id in the path that cannot parse cannot name anything.
fn path_object_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| not_found(raw))
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("No document with id {id}"))
}

fn earnings_limit(limit: Option<i64>) -> Result<i64, AppError> {
    match limit {
        None => Ok(DEFAULT_EARNINGS_LIMIT),
        Some(n) if n < 1 => Err(AppError::Validation(
            "limit must be at least 1".to_string(),
        )),
        Some(n) => Ok(n.min(MAX_EARNINGS_LIMIT)),
    }
}

async fn deactivate(
    state: &AppState,
    kind: CollectionKind,
    raw_id: &str,
) -> Result<Json<ApiResponse<Deactivated>>, AppError> {
    let id = path_object_id(raw_id)?;
    if !state.store.deactivate(kind, id).await? {
        return Err(not_found(raw_id));
    }
    Ok(ApiResponse::ok(Deactivated {
        id: id.to_hex(),
        status: Status::Inactive,
    }))
}

// ==============================================================================
// Movie series
// ==============================================================================

/// # GET /api/admin/movieseries?status=
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatusParams>,
) -> Result<Json<ApiResponse<Vec<PlainMovie>>>, AppError> {
    let status = parse_status(params.status.as_deref())?;
    let movies = state.store.list_movies(status).await?;
    Ok(ApiResponse::ok(movies.iter().map(PlainMovie::from).collect()))
}

/// # POST /api/admin/movieseries
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MoviePayload>,
) -> Result<Json<ApiResponse<PlainMovie>>, AppError> {
    let mut movie = MovieSeries::new(String::new());
    payload.apply_to(&mut movie);
    let movie = state.store.insert_movie(movie).await?;
    tracing::info!(id = ?movie.id, title = %movie.title, "Movie created.");
    Ok(ApiResponse::ok(PlainMovie::from(&movie)))
}

/// # PUT /api/admin/movieseries/:id
/// Replaces the editable fields; ratings and creation date are kept.
pub async fn update_movie(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MoviePayload>,
) -> Result<Json<ApiResponse<PlainMovie>>, AppError> {
    let id = path_object_id(&raw_id)?;
    let mut movie = state
        .store
        .find_movie(id)
        .await?
        .ok_or_else(|| not_found(&raw_id))?;
    payload.apply_to(&mut movie);
    let movie = state
        .store
        .update_movie(movie)
        .await?
        .ok_or_else(|| not_found(&raw_id))?;
    Ok(ApiResponse::ok(PlainMovie::from(&movie)))
}

/// # DELETE /api/admin/movieseries/:id
pub async fn deactivate_movie(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Deactivated>>, AppError> {
    deactivate(&state, CollectionKind::MovieSeries, &raw_id).await
}

/// # POST /api/admin/movieseries/:id/ratings
pub async fn add_rating(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RatingPayload>,
) -> Result<Json<ApiResponse<PlainMovie>>, AppError> {
    let id = path_object_id(&raw_id)?;
    let movie = state
        .store
        .add_rating(id, Rating::new(payload.source, payload.score))
        .await?
        .ok_or_else(|| not_found(&raw_id))?;
    Ok(ApiResponse::ok(PlainMovie::from(&movie)))
}

/// # GET /api/admin/movieseries/:id/earnings
pub async fn get_earnings_summary(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<EarningsSummary>>, AppError> {
    let id = path_object_id(&raw_id)?;
    if state.store.find_movie(id).await?.is_none() {
        return Err(not_found(&raw_id));
    }
    let summary = state.store.earnings_summary(id).await?;
    Ok(ApiResponse::ok(summary))
}

// ==============================================================================
// Cast
// ==============================================================================

/// # GET /api/admin/cast?status=
pub async fn list_cast(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatusParams>,
) -> Result<Json<ApiResponse<Vec<PlainCast>>>, AppError> {
    let status = parse_status(params.status.as_deref())?;
    let cast = state.store.list_cast(status).await?;
    Ok(ApiResponse::ok(cast.iter().map(PlainCast::from).collect()))
}

/// # POST /api/admin/cast
pub async fn create_cast(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CastPayload>,
) -> Result<Json<ApiResponse<PlainCast>>, AppError> {
    let cast = state.store.insert_cast(CastMaster::from(payload)).await?;
    Ok(ApiResponse::ok(PlainCast::from(&cast)))
}

/// # PUT /api/admin/cast/:id
/// Replaces the editable fields; status changes only when given.
pub async fn update_cast(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CastPayload>,
) -> Result<Json<ApiResponse<PlainCast>>, AppError> {
    let id = path_object_id(&raw_id)?;
    let mut cast = state
        .store
        .find_cast(id)
        .await?
        .ok_or_else(|| not_found(&raw_id))?;
    payload.apply_to(&mut cast);
    let cast = state
        .store
        .update_cast(cast)
        .await?
        .ok_or_else(|| not_found(&raw_id))?;
    Ok(ApiResponse::ok(PlainCast::from(&cast)))
}

/// # DELETE /api/admin/cast/:id
pub async fn deactivate_cast(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Deactivated>>, AppError> {
    deactivate(&state, CollectionKind::Cast, &raw_id).await
}

// ==============================================================================
// Earnings
// ==============================================================================

/// # GET /api/admin/earnings/countries?movieId=
pub async fn list_country_earnings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EarningsParams>,
) -> Result<Json<ApiResponse<Vec<PlainCountryEarning>>>, AppError> {
    let movie_id = params
        .movie_id
        .as_deref()
        .map(|raw| body_object_id("movieId", raw))
        .transpose()?;
    let earnings = state.store.list_country_earnings(movie_id).await?;
    Ok(ApiResponse::ok(
        earnings.iter().map(PlainCountryEarning::from).collect(),
    ))
}

/// # POST /api/admin/earnings/countries
pub async fn create_country_earning(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CountryEarningPayload>,
) -> Result<Json<ApiResponse<PlainCountryEarning>>, AppError> {
    let movie_id = body_object_id("movieId", &payload.movie_id)?;
    let mut earning = EarningByCountry::new(movie_id, payload.country_id, payload.payment);
    earning.status = payload.status.unwrap_or_default();
    let earning = state.store.insert_country_earning(earning).await?;
    Ok(ApiResponse::ok(PlainCountryEarning::from(&earning)))
}

/// # DELETE /api/admin/earnings/countries/:id
pub async fn deactivate_country_earning(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Deactivated>>, AppError> {
    deactivate(&state, CollectionKind::CountryEarnings, &raw_id).await
}

/// # GET /api/admin/earnings/actors?movieId=&limit=
/// Active actor earnings, highest payment first.
pub async fn list_actor_earnings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EarningsParams>,
) -> Result<Json<ApiResponse<Vec<PlainActorEarning>>>, AppError> {
    let limit = earnings_limit(params.limit)?;
    let movie_id = params
        .movie_id
        .as_deref()
        .map(|raw| body_object_id("movieId", raw))
        .transpose()?;
    let earnings = state.store.top_actor_earnings(movie_id, limit).await?;
    Ok(ApiResponse::ok(
        earnings.iter().map(PlainActorEarning::from).collect(),
    ))
}

/// # POST /api/admin/earnings/actors
pub async fn create_actor_earning(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ActorEarningPayload>,
) -> Result<Json<ApiResponse<PlainActorEarning>>, AppError> {
    let movie_id = body_object_id("movieId", &payload.movie_id)?;
    let mut earning = TopActorEarning::new(movie_id, payload.actor_id, payload.payment);
    earning.status = payload.status.unwrap_or_default();
    let earning = state.store.insert_actor_earning(earning).await?;
    Ok(ApiResponse::ok(PlainActorEarning::from(&earning)))
}

/// # DELETE /api/admin/earnings/actors/:id
pub async fn deactivate_actor_earning(
    Path(raw_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Deactivated>>, AppError> {
    deactivate(&state, CollectionKind::ActorEarnings, &raw_id).await
}

// ==============================================================================
// Users
// ==============================================================================

/// # POST /api/admin/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserPayload>,
) -> Result<Json<ApiResponse<LeaderboardEntry>>, AppError> {
    let user = state
        .store
        .insert_user(User::new(payload.username, payload.monthly_xp))
        .await?;
    Ok(ApiResponse::ok(LeaderboardEntry::from(&user)))
}

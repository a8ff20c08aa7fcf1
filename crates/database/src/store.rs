use async_trait::async_trait;
use core_types::{
    CastMaster, EarningByCountry, LeaderboardEntry, MovieSeries, MovieTitle, Rating, Schema,
    Status, TopActorEarning, User,
};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime, serde_helpers::serialize_object_id_as_hex_string};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::DbError;

/// The soft-deletable collections, addressed by the admin `deactivate` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    MovieSeries,
    Cast,
    CountryEarnings,
    ActorEarnings,
}

impl CollectionKind {
    pub fn collection_name(&self) -> &'static str {
        match self {
            CollectionKind::MovieSeries => MovieSeries::COLLECTION,
            CollectionKind::Cast => CastMaster::COLLECTION,
            CollectionKind::CountryEarnings => EarningByCountry::COLLECTION,
            CollectionKind::ActorEarnings => TopActorEarning::COLLECTION,
        }
    }
}

/// Active earnings of one movie in one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryTotal {
    #[serde(rename(deserialize = "_id", serialize = "countryId"))]
    pub country_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub entries: i64,
}

/// Per-country breakdown of a movie's active earnings, largest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsSummary {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub movie_id: ObjectId,
    pub countries: Vec<CountryTotal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl EarningsSummary {
    pub fn new(movie_id: ObjectId, countries: Vec<CountryTotal>) -> Self {
        let total = countries.iter().map(|c| c.total).sum();
        Self {
            movie_id,
            countries,
            total,
        }
    }
}

/// Every read and write the application needs from the document database.
///
/// `DbRepository` talks to MongoDB; `InMemoryStore` holds the same
/// collections in process memory and is what the test suites run against.
/// Both apply `Schema::validate` and stamp `createdDate` / `updatedDate`
/// on every write.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- Movie series ---

    /// Case-insensitive substring match on `title`, projecting `_id` and `title`.
    async fn search_movie_titles(&self, query: &str, limit: i64)
    -> Result<Vec<MovieTitle>, DbError>;

    async fn find_movie(&self, id: ObjectId) -> Result<Option<MovieSeries>, DbError>;

    /// Identifiers of active movies in insertion order.
    async fn active_movie_ids(&self, limit: i64) -> Result<Vec<ObjectId>, DbError>;

    async fn list_movies(&self, status: Option<Status>) -> Result<Vec<MovieSeries>, DbError>;

    async fn insert_movie(&self, movie: MovieSeries) -> Result<MovieSeries, DbError>;

    /// Replaces an existing movie. `Ok(None)` when no movie has that `_id`.
    async fn update_movie(&self, movie: MovieSeries) -> Result<Option<MovieSeries>, DbError>;

    async fn add_rating(
        &self,
        id: ObjectId,
        rating: Rating,
    ) -> Result<Option<MovieSeries>, DbError>;

    // --- Cast ---

    async fn list_cast(&self, status: Option<Status>) -> Result<Vec<CastMaster>, DbError>;

    async fn find_cast(&self, id: ObjectId) -> Result<Option<CastMaster>, DbError>;

    async fn insert_cast(&self, cast: CastMaster) -> Result<CastMaster, DbError>;

    async fn update_cast(&self, cast: CastMaster) -> Result<Option<CastMaster>, DbError>;

    // --- Earnings ---

    async fn list_country_earnings(
        &self,
        movie_id: Option<ObjectId>,
    ) -> Result<Vec<EarningByCountry>, DbError>;

    /// Fails with `InvalidReference` when `movie_id` names no movie.
    async fn insert_country_earning(
        &self,
        earning: EarningByCountry,
    ) -> Result<EarningByCountry, DbError>;

    /// Active actor earnings, highest payment first.
    async fn top_actor_earnings(
        &self,
        movie_id: Option<ObjectId>,
        limit: i64,
    ) -> Result<Vec<TopActorEarning>, DbError>;

    /// Fails with `InvalidReference` when `movie_id` names no movie.
    async fn insert_actor_earning(
        &self,
        earning: TopActorEarning,
    ) -> Result<TopActorEarning, DbError>;

    async fn earnings_summary(&self, movie_id: ObjectId) -> Result<EarningsSummary, DbError>;

    // --- Users ---

    /// Users ordered by `monthlyXP` descending. Tie order is unspecified.
    async fn top_users(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, DbError>;

    async fn insert_user(&self, user: User) -> Result<User, DbError>;

    // --- Lifecycle ---

    /// Soft delete. Returns `false` when nothing in `kind` has that `_id`.
    async fn deactivate(&self, kind: CollectionKind, id: ObjectId) -> Result<bool, DbError>;
}

/// Validates a new document, assigns its `_id` and stamps both timestamps.
pub(crate) fn prepare_insert<T: Schema>(mut document: T) -> Result<T, DbError> {
    document.validate()?;
    document.set_id(ObjectId::new());
    document.stamp_created(DateTime::now());
    Ok(document)
}

/// Validates a replacement and carries over the stored creation date.
pub(crate) fn prepare_replace<T: Schema>(mut document: T, stored: &T) -> Result<T, DbError> {
    document.validate()?;
    document.stamp_updated(stored.created_date(), DateTime::now());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn prepare_insert_assigns_id_and_timestamps() {
        let movie = prepare_insert(MovieSeries::new("Inception")).unwrap();
        assert!(movie.id.is_some());
        assert_eq!(movie.created_date, movie.updated_date);
    }

    #[test]
    fn prepare_insert_rejects_invalid_documents() {
        let err = prepare_insert(User::new("", 5)).unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[test]
    fn prepare_replace_keeps_stored_creation_date() {
        let mut stored = MovieSeries::new("The Matrix");
        stored.created_date = DateTime::from_millis(1_000);
        let replacement = prepare_replace(MovieSeries::new("The Matrix (1999)"), &stored).unwrap();
        assert_eq!(replacement.created_date, DateTime::from_millis(1_000));
        assert!(replacement.updated_date > replacement.created_date);
    }

    #[test]
    fn summary_total_is_sum_of_countries() {
        let summary = EarningsSummary::new(
            ObjectId::new(),
            vec![
                CountryTotal {
                    country_id: "US".to_string(),
                    total: dec!(100.50),
                    entries: 2,
                },
                CountryTotal {
                    country_id: "FR".to_string(),
                    total: dec!(20),
                    entries: 1,
                },
            ],
        );
        assert_eq!(summary.total, dec!(120.50));
    }

    #[test]
    fn collection_names_match_stored_collections() {
        assert_eq!(CollectionKind::Cast.collection_name(), "cast");
        assert_eq!(
            CollectionKind::CountryEarnings.collection_name(),
            "earningsByCountry"
        );
        assert_eq!(
            CollectionKind::ActorEarnings.collection_name(),
            "topActorsEarnings"
        );
        assert_eq!(CollectionKind::MovieSeries.collection_name(), "movieseries");
    }
}

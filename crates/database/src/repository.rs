use crate::DbError;
use crate::store::{
    CatalogStore, CollectionKind, CountryTotal, EarningsSummary, prepare_insert, prepare_replace,
};
use async_trait::async_trait;
use core_types::{
    CastMaster, EarningByCountry, LeaderboardEntry, MovieSeries, MovieTitle, Rating, Schema,
    Status, TopActorEarning, User,
};
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{DateTime, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::Deserialize;

/// `_id`-only projection row.
#[derive(Debug, Deserialize)]
struct IdOnly {
    #[serde(rename = "_id")]
    id: ObjectId,
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the document database. It encapsulates all queries and aggregations.
#[derive(Debug, Clone)]
pub struct DbRepository {
    db: Database,
}

impl DbRepository {
    /// Creates a new `DbRepository` over an established database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn collection<T: Schema>(&self) -> Collection<T> {
        self.db.collection::<T>(T::COLLECTION)
    }

    async fn insert<T: Schema>(&self, document: T) -> Result<T, DbError> {
        let document = prepare_insert(document)?;
        self.collection::<T>().insert_one(&document).await?;
        Ok(document)
    }

    async fn replace<T: Schema>(&self, document: T) -> Result<Option<T>, DbError> {
        let Some(id) = document.id() else {
            return Ok(None);
        };
        let collection = self.collection::<T>();
        let Some(stored) = collection.find_one(doc! { "_id": id }).await? else {
            return Ok(None);
        };
        let document = prepare_replace(document, &stored)?;
        collection.replace_one(doc! { "_id": id }, &document).await?;
        Ok(Some(document))
    }

    async fn ensure_movie_exists(&self, movie_id: ObjectId) -> Result<(), DbError> {
        let count = self
            .collection::<MovieSeries>()
            .count_documents(doc! { "_id": movie_id })
            .await?;
        if count == 0 {
            return Err(DbError::InvalidReference(format!(
                "movie {} does not exist",
                movie_id.to_hex()
            )));
        }
        Ok(())
    }
}

/// Filter for a case-insensitive substring match on `title`.
///
/// The user's input is escaped so characters like `.` or `(` match literally.
pub(crate) fn title_filter(query: &str) -> Document {
    doc! {
        "title": {
            "$regex": regex::escape(query),
            "$options": "i",
        }
    }
}

pub(crate) fn status_filter(status: Option<Status>) -> Document {
    match status {
        Some(status) => doc! { "status": status.as_str() },
        None => doc! {},
    }
}

pub(crate) fn movie_filter(movie_id: Option<ObjectId>) -> Document {
    match movie_id {
        Some(movie_id) => doc! { "movieId": movie_id },
        None => doc! {},
    }
}

/// `$match` → `$group` by country → `$sort` by total, largest first.
pub(crate) fn earnings_pipeline(movie_id: ObjectId) -> Vec<Document> {
    vec![
        doc! { "$match": { "movieId": movie_id, "status": Status::Active.as_str() } },
        doc! {
            "$group": {
                "_id": "$countryId",
                "total": { "$sum": "$payment" },
                "entries": { "$sum": 1 },
            }
        },
        doc! { "$sort": { "total": -1, "_id": 1 } },
    ]
}

#[async_trait]
impl CatalogStore for DbRepository {
    async fn search_movie_titles(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<MovieTitle>, DbError> {
        let hits = self
            .collection::<MovieSeries>()
            .clone_with_type::<MovieTitle>()
            .find(title_filter(query))
            .projection(doc! { "_id": 1, "title": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(hits)
    }

    async fn find_movie(&self, id: ObjectId) -> Result<Option<MovieSeries>, DbError> {
        let movie = self
            .collection::<MovieSeries>()
            .find_one(doc! { "_id": id })
            .await?;
        Ok(movie)
    }

    async fn active_movie_ids(&self, limit: i64) -> Result<Vec<ObjectId>, DbError> {
        let rows: Vec<IdOnly> = self
            .collection::<MovieSeries>()
            .clone_with_type::<IdOnly>()
            .find(status_filter(Some(Status::Active)))
            .projection(doc! { "_id": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    async fn list_movies(&self, status: Option<Status>) -> Result<Vec<MovieSeries>, DbError> {
        let movies = self
            .collection::<MovieSeries>()
            .find(status_filter(status))
            .sort(doc! { "createdDate": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(movies)
    }

    async fn insert_movie(&self, movie: MovieSeries) -> Result<MovieSeries, DbError> {
        self.insert(movie).await
    }

    async fn update_movie(&self, movie: MovieSeries) -> Result<Option<MovieSeries>, DbError> {
        self.replace(movie).await
    }

    async fn add_rating(
        &self,
        id: ObjectId,
        rating: Rating,
    ) -> Result<Option<MovieSeries>, DbError> {
        rating.validate()?;
        let update = doc! {
            "$push": { "ratings": mongodb::bson::to_bson(&rating)? },
            "$set": { "updatedDate": DateTime::now() },
        };
        let movie = self
            .collection::<MovieSeries>()
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(movie)
    }

    async fn list_cast(&self, status: Option<Status>) -> Result<Vec<CastMaster>, DbError> {
        let cast = self
            .collection::<CastMaster>()
            .find(status_filter(status))
            .sort(doc! { "castName": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(cast)
    }

    async fn find_cast(&self, id: ObjectId) -> Result<Option<CastMaster>, DbError> {
        let cast = self
            .collection::<CastMaster>()
            .find_one(doc! { "_id": id })
            .await?;
        Ok(cast)
    }

    async fn insert_cast(&self, cast: CastMaster) -> Result<CastMaster, DbError> {
        self.insert(cast).await
    }

    async fn update_cast(&self, cast: CastMaster) -> Result<Option<CastMaster>, DbError> {
        self.replace(cast).await
    }

    async fn list_country_earnings(
        &self,
        movie_id: Option<ObjectId>,
    ) -> Result<Vec<EarningByCountry>, DbError> {
        let earnings = self
            .collection::<EarningByCountry>()
            .find(movie_filter(movie_id))
            .await?
            .try_collect()
            .await?;
        Ok(earnings)
    }

    async fn insert_country_earning(
        &self,
        earning: EarningByCountry,
    ) -> Result<EarningByCountry, DbError> {
        self.ensure_movie_exists(earning.movie_id).await?;
        self.insert(earning).await
    }

    async fn top_actor_earnings(
        &self,
        movie_id: Option<ObjectId>,
        limit: i64,
    ) -> Result<Vec<TopActorEarning>, DbError> {
        let mut filter = movie_filter(movie_id);
        filter.insert("status", Status::Active.as_str());
        let earnings = self
            .collection::<TopActorEarning>()
            .find(filter)
            .sort(doc! { "payment": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(earnings)
    }

    async fn insert_actor_earning(
        &self,
        earning: TopActorEarning,
    ) -> Result<TopActorEarning, DbError> {
        self.ensure_movie_exists(earning.movie_id).await?;
        self.insert(earning).await
    }

    async fn earnings_summary(&self, movie_id: ObjectId) -> Result<EarningsSummary, DbError> {
        let rows: Vec<Document> = self
            .collection::<EarningByCountry>()
            .aggregate(earnings_pipeline(movie_id))
            .await?
            .try_collect()
            .await?;
        let countries = rows
            .into_iter()
            .map(mongodb::bson::from_document::<CountryTotal>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EarningsSummary::new(movie_id, countries))
    }

    async fn top_users(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, DbError> {
        let entries = self
            .collection::<User>()
            .clone_with_type::<LeaderboardEntry>()
            .find(doc! {})
            .sort(doc! { "monthlyXP": -1 })
            .projection(doc! { "_id": 0, "username": 1, "monthlyXP": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(entries)
    }

    async fn insert_user(&self, user: User) -> Result<User, DbError> {
        self.insert(user).await
    }

    async fn deactivate(&self, kind: CollectionKind, id: ObjectId) -> Result<bool, DbError> {
        let result = self
            .db
            .collection::<Document>(kind.collection_name())
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "status": Status::Inactive.as_str(),
                        "updatedDate": DateTime::now(),
                    }
                },
            )
            .await?;
        tracing::info!(
            collection = kind.collection_name(),
            id = %id,
            matched = result.matched_count,
            "Deactivated document."
        );
        Ok(result.matched_count > 0)
    }
}

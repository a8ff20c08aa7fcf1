//! A process-local `CatalogStore`.
//!
//! Mirrors the MongoDB store's observable behaviour (validation, timestamp
//! stamping, insertion order, case-insensitive title search, soft delete)
//! without a server, so handlers can be exercised end to end in tests. It
//! can also be switched offline to reproduce backend failures.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use core_types::{
    CastMaster, EarningByCountry, LeaderboardEntry, Lifecycle, MovieSeries, MovieTitle, Rating,
    Schema, Status, TopActorEarning, User,
};
use mongodb::bson::DateTime;
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::DbError;
use crate::store::{
    CatalogStore, CollectionKind, CountryTotal, EarningsSummary, prepare_insert, prepare_replace,
};

#[derive(Debug, Default)]
struct Collections {
    movies: Vec<MovieSeries>,
    cast: Vec<CastMaster>,
    country_earnings: Vec<EarningByCountry>,
    actor_earnings: Vec<TopActorEarning>,
    users: Vec<User>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<Collections>,
    offline: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with `DbError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), DbError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }
}

fn limit_to(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

fn with_status<T: Lifecycle>(items: &[T], status: Option<Status>) -> Vec<T> {
    items
        .iter()
        .filter(|item| status.is_none_or(|s| item.status() == s))
        .cloned()
        .collect()
}

fn replace_in<T: Schema>(items: &mut [T], document: T) -> Result<Option<T>, DbError> {
    let Some(id) = document.id() else {
        return Ok(None);
    };
    let Some(slot) = items.iter_mut().find(|item| item.id() == Some(id)) else {
        return Ok(None);
    };
    let document = prepare_replace(document, slot)?;
    *slot = document.clone();
    Ok(Some(document))
}

fn deactivate_in<T: Lifecycle>(items: &mut [T], id: ObjectId) -> bool {
    match items.iter_mut().find(|item| item.id() == Some(id)) {
        Some(item) => {
            item.deactivate();
            let created = item.created_date();
            item.stamp_updated(created, DateTime::now());
            true
        }
        None => false,
    }
}

fn ensure_movie_exists(movies: &[MovieSeries], movie_id: ObjectId) -> Result<(), DbError> {
    if movies.iter().any(|movie| movie.id == Some(movie_id)) {
        Ok(())
    } else {
        Err(DbError::InvalidReference(format!(
            "movie {} does not exist",
            movie_id.to_hex()
        )))
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn search_movie_titles(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<MovieTitle>, DbError> {
        self.check_online()?;
        let needle = query.to_lowercase();
        let data = self.data.read().await;
        Ok(data
            .movies
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .filter_map(|movie| {
                movie.id.map(|id| MovieTitle {
                    id,
                    title: movie.title.clone(),
                })
            })
            .take(limit_to(limit))
            .collect())
    }

    async fn find_movie(&self, id: ObjectId) -> Result<Option<MovieSeries>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        Ok(data.movies.iter().find(|m| m.id == Some(id)).cloned())
    }

    async fn active_movie_ids(&self, limit: i64) -> Result<Vec<ObjectId>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        Ok(data
            .movies
            .iter()
            .filter(|movie| movie.status.is_active())
            .filter_map(|movie| movie.id)
            .take(limit_to(limit))
            .collect())
    }

    async fn list_movies(&self, status: Option<Status>) -> Result<Vec<MovieSeries>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        let mut movies = with_status(&data.movies, status);
        movies.reverse();
        Ok(movies)
    }

    async fn insert_movie(&self, movie: MovieSeries) -> Result<MovieSeries, DbError> {
        self.check_online()?;
        let movie = prepare_insert(movie)?;
        self.data.write().await.movies.push(movie.clone());
        Ok(movie)
    }

    async fn update_movie(&self, movie: MovieSeries) -> Result<Option<MovieSeries>, DbError> {
        self.check_online()?;
        replace_in(&mut self.data.write().await.movies, movie)
    }

    async fn add_rating(
        &self,
        id: ObjectId,
        rating: Rating,
    ) -> Result<Option<MovieSeries>, DbError> {
        self.check_online()?;
        rating.validate()?;
        let mut data = self.data.write().await;
        let Some(movie) = data.movies.iter_mut().find(|m| m.id == Some(id)) else {
            return Ok(None);
        };
        movie.ratings.push(rating);
        movie.updated_date = DateTime::now();
        Ok(Some(movie.clone()))
    }

    async fn list_cast(&self, status: Option<Status>) -> Result<Vec<CastMaster>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        let mut cast = with_status(&data.cast, status);
        cast.sort_by(|a, b| a.cast_name.cmp(&b.cast_name));
        Ok(cast)
    }

    async fn find_cast(&self, id: ObjectId) -> Result<Option<CastMaster>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        Ok(data.cast.iter().find(|c| c.id == Some(id)).cloned())
    }

    async fn insert_cast(&self, cast: CastMaster) -> Result<CastMaster, DbError> {
        self.check_online()?;
        let cast = prepare_insert(cast)?;
        self.data.write().await.cast.push(cast.clone());
        Ok(cast)
    }

    async fn update_cast(&self, cast: CastMaster) -> Result<Option<CastMaster>, DbError> {
        self.check_online()?;
        replace_in(&mut self.data.write().await.cast, cast)
    }

    async fn list_country_earnings(
        &self,
        movie_id: Option<ObjectId>,
    ) -> Result<Vec<EarningByCountry>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        Ok(data
            .country_earnings
            .iter()
            .filter(|e| movie_id.is_none_or(|id| e.movie_id == id))
            .cloned()
            .collect())
    }

    async fn insert_country_earning(
        &self,
        earning: EarningByCountry,
    ) -> Result<EarningByCountry, DbError> {
        self.check_online()?;
        let mut data = self.data.write().await;
        ensure_movie_exists(&data.movies, earning.movie_id)?;
        let earning = prepare_insert(earning)?;
        data.country_earnings.push(earning.clone());
        Ok(earning)
    }

    async fn top_actor_earnings(
        &self,
        movie_id: Option<ObjectId>,
        limit: i64,
    ) -> Result<Vec<TopActorEarning>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        let mut earnings: Vec<TopActorEarning> = data
            .actor_earnings
            .iter()
            .filter(|e| e.status.is_active())
            .filter(|e| movie_id.is_none_or(|id| e.movie_id == id))
            .cloned()
            .collect();
        earnings.sort_by(|a, b| b.payment.cmp(&a.payment));
        earnings.truncate(limit_to(limit));
        Ok(earnings)
    }

    async fn insert_actor_earning(
        &self,
        earning: TopActorEarning,
    ) -> Result<TopActorEarning, DbError> {
        self.check_online()?;
        let mut data = self.data.write().await;
        ensure_movie_exists(&data.movies, earning.movie_id)?;
        let earning = prepare_insert(earning)?;
        data.actor_earnings.push(earning.clone());
        Ok(earning)
    }

    async fn earnings_summary(&self, movie_id: ObjectId) -> Result<EarningsSummary, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        let mut grouped: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
        for earning in data
            .country_earnings
            .iter()
            .filter(|e| e.movie_id == movie_id && e.status.is_active())
        {
            let entry = grouped
                .entry(earning.country_id.clone())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += earning.payment;
            entry.1 += 1;
        }
        let mut countries: Vec<CountryTotal> = grouped
            .into_iter()
            .map(|(country_id, (total, entries))| CountryTotal {
                country_id,
                total,
                entries,
            })
            .collect();
        // BTreeMap order breaks ties by country id; the stable sort keeps it.
        countries.sort_by(|a, b| b.total.cmp(&a.total));
        Ok(EarningsSummary::new(movie_id, countries))
    }

    async fn top_users(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, DbError> {
        self.check_online()?;
        let data = self.data.read().await;
        let mut entries: Vec<LeaderboardEntry> =
            data.users.iter().map(LeaderboardEntry::from).collect();
        entries.sort_by(|a, b| b.monthly_xp.cmp(&a.monthly_xp));
        entries.truncate(limit_to(limit));
        Ok(entries)
    }

    async fn insert_user(&self, user: User) -> Result<User, DbError> {
        self.check_online()?;
        let user = prepare_insert(user)?;
        self.data.write().await.users.push(user.clone());
        Ok(user)
    }

    async fn deactivate(&self, kind: CollectionKind, id: ObjectId) -> Result<bool, DbError> {
        self.check_online()?;
        let mut data = self.data.write().await;
        Ok(match kind {
            CollectionKind::MovieSeries => deactivate_in(&mut data.movies, id),
            CollectionKind::Cast => deactivate_in(&mut data.cast, id),
            CollectionKind::CountryEarnings => deactivate_in(&mut data.country_earnings, id),
            CollectionKind::ActorEarnings => deactivate_in(&mut data.actor_earnings, id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn seeded_movies(store: &InMemoryStore, titles: &[&str]) -> Vec<MovieSeries> {
        let mut movies = Vec::new();
        for title in titles {
            movies.push(store.insert_movie(MovieSeries::new(*title)).await.unwrap());
        }
        movies
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = InMemoryStore::new();
        seeded_movies(&store, &["The Matrix", "Matrix Reloaded", "Inception"]).await;

        let hits = store.search_movie_titles("matrix", 5).await.unwrap();
        let titles: Vec<_> = hits.iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["The Matrix", "Matrix Reloaded"]);
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let store = InMemoryStore::new();
        let titles: Vec<String> = (0..8).map(|i| format!("Saw {i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        seeded_movies(&store, &refs).await;

        assert_eq!(store.search_movie_titles("saw", 5).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn active_ids_skip_inactive_movies_and_keep_insertion_order() {
        let store = InMemoryStore::new();
        let movies = seeded_movies(&store, &["A", "B", "C"]).await;
        let b = movies[1].id.unwrap();
        assert!(store.deactivate(CollectionKind::MovieSeries, b).await.unwrap());

        let ids = store.active_movie_ids(20).await.unwrap();
        assert_eq!(ids, vec![movies[0].id.unwrap(), movies[2].id.unwrap()]);
    }

    #[tokio::test]
    async fn update_keeps_created_date_and_unknown_id_is_none() {
        let store = InMemoryStore::new();
        let movie = store.insert_movie(MovieSeries::new("Heat")).await.unwrap();

        let mut changed = movie.clone();
        changed.title = "Heat (1995)".to_string();
        let updated = store.update_movie(changed).await.unwrap().unwrap();
        assert_eq!(updated.created_date, movie.created_date);
        assert_eq!(updated.title, "Heat (1995)");

        let mut stranger = MovieSeries::new("Ghost");
        stranger.id = Some(ObjectId::new());
        assert!(store.update_movie(stranger).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_cast_returns_stored_member() {
        let store = InMemoryStore::new();
        let cast = store
            .insert_cast(CastMaster::new("Keanu Reeves", "Actor", dec!(100)))
            .await
            .unwrap();
        let found = store.find_cast(cast.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(found.cast_name, "Keanu Reeves");
        assert!(store.find_cast(ObjectId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn earnings_require_existing_movie() {
        let store = InMemoryStore::new();
        let err = store
            .insert_country_earning(EarningByCountry::new(ObjectId::new(), "US", dec!(10)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn summary_groups_active_earnings_by_country() {
        let store = InMemoryStore::new();
        let movie = seeded_movies(&store, &["Jaws"]).await.remove(0);
        let movie_id = movie.id.unwrap();
        for (country, payment) in [("US", dec!(100)), ("UK", dec!(40)), ("US", dec!(25))] {
            store
                .insert_country_earning(EarningByCountry::new(movie_id, country, payment))
                .await
                .unwrap();
        }
        let dropped = store
            .insert_country_earning(EarningByCountry::new(movie_id, "UK", dec!(999)))
            .await
            .unwrap();
        store
            .deactivate(CollectionKind::CountryEarnings, dropped.id.unwrap())
            .await
            .unwrap();

        let summary = store.earnings_summary(movie_id).await.unwrap();
        assert_eq!(summary.total, dec!(165));
        assert_eq!(summary.countries[0].country_id, "US");
        assert_eq!(summary.countries[0].total, dec!(125));
        assert_eq!(summary.countries[0].entries, 2);
        assert_eq!(summary.countries[1].total, dec!(40));
    }

    #[tokio::test]
    async fn top_actor_earnings_are_sorted_by_payment() {
        let store = InMemoryStore::new();
        let movie_id = seeded_movies(&store, &["Speed"]).await[0].id.unwrap();
        for (actor, payment) in [("a", dec!(5)), ("b", dec!(50)), ("c", dec!(20))] {
            store
                .insert_actor_earning(TopActorEarning::new(movie_id, actor, payment))
                .await
                .unwrap();
        }
        let top = store.top_actor_earnings(Some(movie_id), 2).await.unwrap();
        let actors: Vec<_> = top.iter().map(|e| e.actor_id.as_str()).collect();
        assert_eq!(actors, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = InMemoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.top_users(10).await,
            Err(DbError::Unavailable(_))
        ));
        store.set_offline(false);
        assert!(store.top_users(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deactivating_unknown_id_reports_false() {
        let store = InMemoryStore::new();
        assert!(
            !store
                .deactivate(CollectionKind::Cast, ObjectId::new())
                .await
                .unwrap()
        );
    }
}

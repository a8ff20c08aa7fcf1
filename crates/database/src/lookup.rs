use core_types::MovieSeries;
use mongodb::bson::oid::ObjectId;

use crate::DbError;
use crate::store::CatalogStore;

/// Outcome of reading one movie for its detail page.
///
/// A missing movie is an ordinary outcome; a backend failure is kept apart
/// from it so callers can tell an outage from an absent document.
#[derive(Debug)]
pub enum MovieLookup {
    Found(MovieSeries),
    NotFound,
    BackendError(DbError),
}

/// Fetches a movie by its hex identifier.
///
/// An identifier that is not a valid `ObjectId` cannot name any document and
/// is reported as `NotFound`. Backend failures are returned untouched for
/// the caller to report.
pub async fn lookup_movie(store: &dyn CatalogStore, id: &str) -> MovieLookup {
    let Ok(object_id) = ObjectId::parse_str(id) else {
        tracing::debug!(id, "Malformed movie id, treating as not found.");
        return MovieLookup::NotFound;
    };

    match store.find_movie(object_id).await {
        Ok(Some(movie)) => MovieLookup::Found(movie),
        Ok(None) => MovieLookup::NotFound,
        Err(e) => MovieLookup::BackendError(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    #[tokio::test]
    async fn existing_movie_is_found() {
        let store = InMemoryStore::new();
        let movie = store
            .insert_movie(MovieSeries::new("Alien"))
            .await
            .unwrap();
        let id = movie.id.unwrap().to_hex();

        match lookup_movie(&store, &id).await {
            MovieLookup::Found(found) => assert_eq!(found.title, "Alien"),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let store = InMemoryStore::new();
        let unknown = ObjectId::new().to_hex();
        assert!(matches!(
            lookup_movie(&store, &unknown).await,
            MovieLookup::NotFound
        ));
        assert!(matches!(
            lookup_movie(&store, "not-an-id").await,
            MovieLookup::NotFound
        ));
    }

    #[tokio::test]
    async fn outage_is_distinct_from_not_found() {
        let store = InMemoryStore::new();
        store.set_offline(true);
        let id = ObjectId::new().to_hex();
        assert!(matches!(
            lookup_movie(&store, &id).await,
            MovieLookup::BackendError(DbError::Unavailable(_))
        ));
    }
}

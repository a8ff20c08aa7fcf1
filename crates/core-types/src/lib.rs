pub mod documents;
pub mod enums;
pub mod error;
pub mod plain;
pub mod schema;

// Re-export the core types to provide a clean public API.
pub use bson::oid::ObjectId;
pub use documents::{
    CastMaster, EarningByCountry, LeaderboardEntry, MovieSeries, MovieTitle, Rating,
    TopActorEarning, User,
};
pub use enums::Status;
pub use error::CoreError;
pub use plain::{
    PlainActorEarning, PlainCast, PlainCountryEarning, PlainMovie, PlainMovieTitle, PlainRating,
};
pub use schema::{Lifecycle, Schema};

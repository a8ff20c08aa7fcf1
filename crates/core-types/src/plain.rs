//! Plain (lean) views of stored documents for JSON transport.
//!
//! BSON `ObjectId` and `DateTime` serialize to extended JSON (`{"$oid": ..}`)
//! under `serde_json`. These views flatten them to hex strings and RFC 3339
//! timestamps so API clients see ordinary JSON.

use bson::DateTime as BsonDateTime;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::documents::{
    CastMaster, EarningByCountry, MovieSeries, MovieTitle, Rating, TopActorEarning,
};
use crate::enums::Status;

fn hex(id: Option<ObjectId>) -> String {
    id.map(|oid| oid.to_hex()).unwrap_or_default()
}

fn utc(date: BsonDateTime) -> DateTime<Utc> {
    date.to_chrono()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlainMovieTitle {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
}

impl From<&MovieTitle> for PlainMovieTitle {
    fn from(hit: &MovieTitle) -> Self {
        Self {
            id: hit.id.to_hex(),
            title: hit.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainRating {
    pub source: String,
    pub score: f64,
    pub rated_date: DateTime<Utc>,
}

impl From<&Rating> for PlainRating {
    fn from(rating: &Rating) -> Self {
        Self {
            source: rating.source.clone(),
            score: rating.score,
            rated_date: utc(rating.rated_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainMovie {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub status: Status,
    pub ratings: Vec<PlainRating>,
    pub average_rating: Option<f64>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl From<&MovieSeries> for PlainMovie {
    fn from(movie: &MovieSeries) -> Self {
        Self {
            id: hex(movie.id),
            title: movie.title.clone(),
            description: movie.description.clone(),
            release_year: movie.release_year,
            poster_url: movie.poster_url.clone(),
            status: movie.status,
            ratings: movie.ratings.iter().map(PlainRating::from).collect(),
            average_rating: movie.average_rating(),
            created_date: utc(movie.created_date),
            updated_date: utc(movie.updated_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainCast {
    #[serde(rename = "_id")]
    pub id: String,
    pub cast_name: String,
    pub cast_type: String,
    pub image_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_earning: Decimal,
    pub status: Status,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl From<&CastMaster> for PlainCast {
    fn from(cast: &CastMaster) -> Self {
        Self {
            id: hex(cast.id),
            cast_name: cast.cast_name.clone(),
            cast_type: cast.cast_type.clone(),
            image_url: cast.image_url.clone(),
            expected_earning: cast.expected_earning,
            status: cast.status,
            created_date: utc(cast.created_date),
            updated_date: utc(cast.updated_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainCountryEarning {
    #[serde(rename = "_id")]
    pub id: String,
    pub movie_id: String,
    pub country_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub payment: Decimal,
    pub status: Status,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl From<&EarningByCountry> for PlainCountryEarning {
    fn from(earning: &EarningByCountry) -> Self {
        Self {
            id: hex(earning.id),
            movie_id: earning.movie_id.to_hex(),
            country_id: earning.country_id.clone(),
            payment: earning.payment,
            status: earning.status,
            created_date: utc(earning.created_date),
            updated_date: utc(earning.updated_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainActorEarning {
    #[serde(rename = "_id")]
    pub id: String,
    pub movie_id: String,
    pub actor_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub payment: Decimal,
    pub status: Status,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl From<&TopActorEarning> for PlainActorEarning {
    fn from(earning: &TopActorEarning) -> Self {
        Self {
            id: hex(earning.id),
            movie_id: earning.movie_id.to_hex(),
            actor_id: earning.actor_id.clone(),
            payment: earning.payment,
            status: earning.status,
            created_date: utc(earning.created_date),
            updated_date: utc(earning.updated_date),
        }
    }
}

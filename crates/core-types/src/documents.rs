use bson::DateTime;
use bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::Status;
use crate::error::CoreError;
use crate::schema::{Lifecycle, Schema, require_text};

pub const MAX_RATING_SCORE: f64 = 10.0;

// ==============================================================================
// Movie series
// ==============================================================================

/// A single review score attached to a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub source: String,
    pub score: f64,
    pub rated_date: DateTime,
}

impl Rating {
    pub fn new(source: impl Into<String>, score: f64) -> Self {
        Self {
            source: source.into(),
            score,
            rated_date: DateTime::now(),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("source", &self.source)?;
        if !self.score.is_finite() || !(0.0..=MAX_RATING_SCORE).contains(&self.score) {
            return Err(CoreError::InvalidInput(
                "score".to_string(),
                format!("must be between 0 and {MAX_RATING_SCORE}"),
            ));
        }
        Ok(())
    }
}

/// Stored in the `movieseries` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSeries {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub ratings: Vec<Rating>,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

impl MovieSeries {
    pub fn new(title: impl Into<String>) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            title: title.into(),
            description: None,
            release_year: None,
            poster_url: None,
            status: Status::Active,
            ratings: Vec::new(),
            created_date: now,
            updated_date: now,
        }
    }

    /// Mean of all rating scores, `None` when the movie has not been rated.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let total: f64 = self.ratings.iter().map(|r| r.score).sum();
        Some(total / self.ratings.len() as f64)
    }
}

impl Schema for MovieSeries {
    const COLLECTION: &'static str = "movieseries";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn created_date(&self) -> DateTime {
        self.created_date
    }

    fn set_timestamps(&mut self, created: DateTime, updated: DateTime) {
        self.created_date = created;
        self.updated_date = updated;
    }

    fn validate(&self) -> Result<(), CoreError> {
        require_text("title", &self.title)?;
        if let Some(year) = self.release_year {
            if !(1870..=3000).contains(&year) {
                return Err(CoreError::InvalidInput(
                    "releaseYear".to_string(),
                    format!("{year} is not a plausible release year"),
                ));
            }
        }
        self.ratings.iter().try_for_each(Rating::validate)
    }
}

impl Lifecycle for MovieSeries {
    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

// ==============================================================================
// Cast master
// ==============================================================================

/// Stored in the `cast` collection. Standalone, nothing references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMaster {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub cast_name: String,
    pub cast_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub expected_earning: Decimal,
    #[serde(default)]
    pub status: Status,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

impl CastMaster {
    pub fn new(
        cast_name: impl Into<String>,
        cast_type: impl Into<String>,
        expected_earning: Decimal,
    ) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            cast_name: cast_name.into(),
            cast_type: cast_type.into(),
            image_url: None,
            expected_earning,
            status: Status::Active,
            created_date: now,
            updated_date: now,
        }
    }
}

impl Schema for CastMaster {
    const COLLECTION: &'static str = "cast";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn created_date(&self) -> DateTime {
        self.created_date
    }

    fn set_timestamps(&mut self, created: DateTime, updated: DateTime) {
        self.created_date = created;
        self.updated_date = updated;
    }

    fn validate(&self) -> Result<(), CoreError> {
        require_text("castName", &self.cast_name)?;
        require_text("castType", &self.cast_type)?;
        require_non_negative("expectedEarning", self.expected_earning)
    }
}

impl Lifecycle for CastMaster {
    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

// ==============================================================================
// Earnings
// ==============================================================================

/// What one movie earned in one country. Stored in `earningsByCountry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningByCountry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Weak back-reference to a `MovieSeries`, not ownership.
    pub movie_id: ObjectId,
    pub country_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub payment: Decimal,
    #[serde(default)]
    pub status: Status,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

impl EarningByCountry {
    pub fn new(movie_id: ObjectId, country_id: impl Into<String>, payment: Decimal) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            movie_id,
            country_id: country_id.into(),
            payment,
            status: Status::Active,
            created_date: now,
            updated_date: now,
        }
    }
}

impl Schema for EarningByCountry {
    const COLLECTION: &'static str = "earningsByCountry";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn created_date(&self) -> DateTime {
        self.created_date
    }

    fn set_timestamps(&mut self, created: DateTime, updated: DateTime) {
        self.created_date = created;
        self.updated_date = updated;
    }

    fn validate(&self) -> Result<(), CoreError> {
        require_text("countryId", &self.country_id)?;
        require_non_negative("payment", self.payment)
    }
}

impl Lifecycle for EarningByCountry {
    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

/// What one actor earned on one movie. Stored in `topActorsEarnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopActorEarning {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub movie_id: ObjectId,
    pub actor_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub payment: Decimal,
    #[serde(default)]
    pub status: Status,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

impl TopActorEarning {
    pub fn new(movie_id: ObjectId, actor_id: impl Into<String>, payment: Decimal) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            movie_id,
            actor_id: actor_id.into(),
            payment,
            status: Status::Active,
            created_date: now,
            updated_date: now,
        }
    }
}

impl Schema for TopActorEarning {
    const COLLECTION: &'static str = "topActorsEarnings";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn created_date(&self) -> DateTime {
        self.created_date
    }

    fn set_timestamps(&mut self, created: DateTime, updated: DateTime) {
        self.created_date = created;
        self.updated_date = updated;
    }

    fn validate(&self) -> Result<(), CoreError> {
        require_text("actorId", &self.actor_id)?;
        require_non_negative("payment", self.payment)
    }
}

impl Lifecycle for TopActorEarning {
    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

// ==============================================================================
// Users
// ==============================================================================

/// Stored in the `users` collection. Only the leaderboard reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(rename = "monthlyXP", default, deserialize_with = "deserialize_xp")]
    pub monthly_xp: i64,
    pub created_date: DateTime,
    pub updated_date: DateTime,
}

impl User {
    pub fn new(username: impl Into<String>, monthly_xp: i64) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            username: username.into(),
            monthly_xp,
            created_date: now,
            updated_date: now,
        }
    }
}

impl Schema for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }

    fn created_date(&self) -> DateTime {
        self.created_date
    }

    fn set_timestamps(&mut self, created: DateTime, updated: DateTime) {
        self.created_date = created;
        self.updated_date = updated;
    }

    fn validate(&self) -> Result<(), CoreError> {
        require_text("username", &self.username)
    }
}

// ==============================================================================
// Projections
// ==============================================================================

/// Search hit: only `_id` and `title` are projected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieTitle {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
}

/// Leaderboard row: `username` and `monthlyXP`, no `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    #[serde(rename = "monthlyXP", default, deserialize_with = "deserialize_xp")]
    pub monthly_xp: i64,
}

impl From<&User> for LeaderboardEntry {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            monthly_xp: user.monthly_xp,
        }
    }
}

/// Reads `monthlyXP` stored as any BSON number (Int32, Int64 or Double).
/// Fractional scores are rounded to the nearest whole point.
fn deserialize_xp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct XpVisitor;

    impl Visitor<'_> for XpVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a numeric monthlyXP score")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            i64::try_from(value).map_err(|_| E::custom("monthlyXP is out of range"))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
            if !value.is_finite() || value.abs() >= i64::MAX as f64 {
                return Err(E::custom("monthlyXP is not a finite score"));
            }
            Ok(value.round() as i64)
        }
    }

    deserializer.deserialize_any(XpVisitor)
}

fn require_non_negative(field: &str, value: Decimal) -> Result<(), CoreError> {
    if value < Decimal::ZERO {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(())
}

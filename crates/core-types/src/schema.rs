//! The contract every stored document fulfils.
//!
//! A `Schema` knows which collection it lives in, how to expose its `_id`,
//! and how the store stamps its `createdDate` / `updatedDate` fields. Write
//! validation also lives here so the MongoDB store and the in-memory store
//! apply the same rules.

use bson::DateTime;
use bson::oid::ObjectId;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::enums::Status;
use crate::error::CoreError;

pub trait Schema: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Name of the backing collection.
    const COLLECTION: &'static str;

    fn id(&self) -> Option<ObjectId>;

    fn set_id(&mut self, id: ObjectId);

    fn created_date(&self) -> DateTime;

    /// Overwrites both timestamps. Called by the store, never by handlers.
    fn set_timestamps(&mut self, created: DateTime, updated: DateTime);

    fn validate(&self) -> Result<(), CoreError>;

    /// Stamps a document that is about to be inserted for the first time.
    fn stamp_created(&mut self, now: DateTime) {
        self.set_timestamps(now, now);
    }

    /// Stamps a document that replaces `previous`, keeping its creation date.
    fn stamp_updated(&mut self, previous_created: DateTime, now: DateTime) {
        self.set_timestamps(previous_created, now);
    }
}

/// Documents that support the soft-delete lifecycle.
pub trait Lifecycle: Schema {
    fn status(&self) -> Status;

    fn set_status(&mut self, status: Status);

    fn deactivate(&mut self) {
        self.set_status(Status::Inactive);
    }
}

/// Rejects an empty or whitespace-only string field.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::MissingField(field.to_string()));
    }
    Ok(())
}

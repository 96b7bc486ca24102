//! # Document Store
//!
//! The remote collaborator the views synchronise against: a collection of day
//! records keyed by ISO date plus one singleton global note. Implementations
//! must give writes merge semantics and assign the author's timestamp.

use async_trait::async_trait;
use shared::{Author, DateRange, DayPatch, DayRecord, GlobalNote};
use thiserror::Error;

use super::date_utils::DateError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Store responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to decode store response: {0}")]
    Decode(String),
    #[error(transparent)]
    InvalidDate(#[from] DateError),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. `Ok(None)` means the document does not exist.
    async fn get_day(&self, date: &str) -> Result<Option<DayRecord>, StoreError>;

    /// Upsert with merge: fields absent from `patch` are left untouched.
    /// The store re-stamps the timestamp owned by `author`.
    async fn merge_day(&self, date: &str, patch: &DayPatch, author: Author) -> Result<(), StoreError>;

    /// All records whose date lies in the inclusive range
    async fn query_days(&self, range: &DateRange) -> Result<Vec<DayRecord>, StoreError>;

    async fn get_global_note(&self) -> Result<Option<GlobalNote>, StoreError>;

    async fn merge_global_note(&self, note: &str) -> Result<(), StoreError>;
}

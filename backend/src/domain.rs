use crate::db::DbConnection;
use shared::{parse_iso_date, Author, DateRange, DayPatch, DayRecord, GlobalNote};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid date: {0}. Expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid range: {start} is after {end}")]
    InvalidRange { start: String, end: String },
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

fn validate_date(date: &str) -> Result<(), ServiceError> {
    match parse_iso_date(date) {
        Some(_) => Ok(()),
        None => Err(ServiceError::InvalidDate(date.to_string())),
    }
}

/// Day records and the global note, with date validation in front of storage
#[derive(Clone)]
pub struct DayService {
    db: DbConnection,
}

impl DayService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub async fn get_day(&self, date: &str) -> Result<Option<DayRecord>, ServiceError> {
        validate_date(date)?;
        Ok(self.db.get_day(date).await?)
    }

    pub async fn merge_day(&self, date: &str, patch: &DayPatch, author: Author) -> Result<(), ServiceError> {
        validate_date(date)?;
        if patch.is_empty() {
            // nothing to write, but the timestamp would still move
            info!("Ignoring empty {} write for {}", author, date);
            return Ok(());
        }
        self.db.merge_day(date, patch, author).await?;
        info!("Merged {} write for {}", author, date);
        Ok(())
    }

    pub async fn query_days(&self, range: &DateRange) -> Result<Vec<DayRecord>, ServiceError> {
        validate_date(&range.start)?;
        validate_date(&range.end)?;
        if range.start > range.end {
            return Err(ServiceError::InvalidRange {
                start: range.start.clone(),
                end: range.end.clone(),
            });
        }
        let records = self.db.query_days(range).await?;
        info!("Returning {} records for {} to {}", records.len(), range.start, range.end);
        Ok(records)
    }

    pub async fn get_global_note(&self) -> Result<Option<GlobalNote>, ServiceError> {
        Ok(self.db.get_global_note().await?)
    }

    pub async fn merge_global_note(&self, note: &str) -> Result<(), ServiceError> {
        self.db.merge_global_note(note).await?;
        info!("Updated global note");
        Ok(())
    }
}

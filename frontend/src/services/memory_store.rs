//! In-process [`DocumentStore`] with the same merge and timestamp rules as
//! the backend. Used by tests and for running the views without a server.
//! Latency and failures can be injected to exercise the views' async paths.

use async_trait::async_trait;
use chrono::Utc;
use shared::{Author, DateRange, DayPatch, DayRecord, GlobalNote};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use super::date_utils::parse_date_str;
use super::store::{DocumentStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    days: Mutex<BTreeMap<String, DayRecord>>,
    global_note: Mutex<Option<GlobalNote>>,
    latency: Mutex<HashMap<String, Duration>>,
    write_latency: Mutex<Option<Duration>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    day_writes: AtomicUsize,
    note_writes: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing merge and timestamps
    pub fn insert(&self, record: DayRecord) {
        lock(&self.days).insert(record.date.clone(), record);
    }

    /// Current stored record, without latency or failure injection
    pub fn record(&self, date: &str) -> Option<DayRecord> {
        lock(&self.days).get(date).cloned()
    }

    pub fn global_note(&self) -> Option<GlobalNote> {
        lock(&self.global_note).clone()
    }

    /// Delay reads keyed by `key`: a point read of that date, or a range
    /// query starting at that date.
    pub fn set_latency(&self, key: &str, delay: Duration) {
        lock(&self.latency).insert(key.to_string(), delay);
    }

    /// Delay every write by `delay` before it is applied
    pub fn set_write_latency(&self, delay: Duration) {
        *lock(&self.write_latency) = Some(delay);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful day writes
    pub fn day_write_count(&self) -> usize {
        self.day_writes.load(Ordering::SeqCst)
    }

    /// Number of successful global note writes
    pub fn note_write_count(&self) -> usize {
        self.note_writes.load(Ordering::SeqCst)
    }

    async fn simulate_read(&self, key: &str) -> Result<(), StoreError> {
        let delay = lock(&self.latency).get(key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of {} failed", key)));
        }
        Ok(())
    }

    async fn simulate_write(&self, key: &str) -> Result<(), StoreError> {
        let delay = *lock(&self.write_latency);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("write of {} failed", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn get_day(&self, date: &str) -> Result<Option<DayRecord>, StoreError> {
        self.simulate_read(date).await?;
        Ok(lock(&self.days).get(date).cloned())
    }

    async fn merge_day(&self, date: &str, patch: &DayPatch, author: Author) -> Result<(), StoreError> {
        parse_date_str(date)?;
        self.simulate_write(date).await?;

        let mut days = lock(&self.days);
        let record = days
            .entry(date.to_string())
            .or_insert_with(|| DayRecord::new(date));
        record.apply_patch(patch);
        record.stamp(author, Utc::now());
        self.day_writes.fetch_add(1, Ordering::SeqCst);

        debug!("💾 STORE: merged {} write into {}", author, date);
        Ok(())
    }

    async fn query_days(&self, range: &DateRange) -> Result<Vec<DayRecord>, StoreError> {
        self.simulate_read(&range.start).await?;
        let days = lock(&self.days);
        Ok(days
            .range(range.start.clone()..=range.end.clone())
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn get_global_note(&self) -> Result<Option<GlobalNote>, StoreError> {
        self.simulate_read(shared::GLOBAL_NOTE_ID).await?;
        Ok(lock(&self.global_note).clone())
    }

    async fn merge_global_note(&self, note: &str) -> Result<(), StoreError> {
        self.simulate_write(shared::GLOBAL_NOTE_ID).await?;
        *lock(&self.global_note) = Some(GlobalNote {
            note: note.to_string(),
            updated_at: Some(Utc::now()),
        });
        self.note_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_merge_preserves_unrelated_fields() {
        let store = InMemoryStore::new();
        store
            .merge_day("2024-03-05", &DayPatch::note("hi"), Author::Staff)
            .await
            .unwrap();
        store
            .merge_day("2024-03-05", &DayPatch::schedule(true, "09:00", "17:00"), Author::Staff)
            .await
            .unwrap();

        let record = store.get_day("2024-03-05").await.unwrap().unwrap();
        assert_eq!(record.date, "2024-03-05");
        assert_eq!(record.available, Some(true));
        assert_eq!(record.start_time.as_deref(), Some("09:00"));
        assert_eq!(record.end_time.as_deref(), Some("17:00"));
        assert_eq!(record.note.as_deref(), Some("hi"));
        assert!(record.updated_at.is_some());
        assert!(record.manager_updated_at.is_none());
    }

    #[tokio::test]
    async fn test_query_is_inclusive() {
        let store = InMemoryStore::new();
        for date in ["2024-01-31", "2024-02-01", "2024-02-29", "2024-03-01"] {
            store.insert(DayRecord::new(date));
        }

        let records = store
            .query_days(&DateRange::new("2024-02-01", "2024-02-29"))
            .await
            .unwrap();
        let dates: Vec<_> = records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-01", "2024-02-29"]);
    }

    #[tokio::test]
    async fn test_rejects_malformed_date() {
        let store = InMemoryStore::new();
        let result = store.merge_day("2024-3-5", &DayPatch::note("x"), Author::Staff).await;
        assert!(matches!(result, Err(StoreError::InvalidDate(_))));
        assert_eq!(store.day_write_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = InMemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.merge_global_note("x").await.is_err());

        store.set_fail_reads(true);
        assert!(store.get_day("2024-03-05").await.is_err());
        assert!(store.get_global_note().await.is_err());
    }
}

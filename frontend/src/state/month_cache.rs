//! # Month Cache
//!
//! In-memory snapshot of the day records for the visible month, keyed by
//! ISO date string. The cache belongs to exactly one view; it is cleared and
//! rebuilt on every month load and only otherwise touched by write-through
//! after a successful save.

use shared::{DayPatch, DayRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthCache {
    entries: HashMap<String, DayRecord>,
}

impl MonthCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Insert records keyed by their identifier, replacing any earlier snapshot of the same date
    pub fn populate<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = DayRecord>,
    {
        for record in records {
            self.entries.insert(record.date.clone(), record);
        }
    }

    pub fn get(&self, date: &str) -> Option<&DayRecord> {
        self.entries.get(date)
    }

    /// Shallow-merge the written fields over the cached entry (or `{date}` if none)
    pub fn merge_written(&mut self, date: &str, patch: &DayPatch) -> &DayRecord {
        let entry = self
            .entries
            .entry(date.to_string())
            .or_insert_with(|| DayRecord::new(date));
        entry.apply_patch(patch);
        entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

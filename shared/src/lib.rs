use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed identifier of the singleton manager note document
pub const GLOBAL_NOTE_ID: &str = "global";

/// Which role authored a write. Each role re-stamps its own timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    /// Staff member reporting their own availability
    Staff,
    /// Manager reviewing the calendar
    Manager,
}

impl Author {
    /// Name of the wire field this author's writes re-stamp
    pub fn timestamp_field(&self) -> &'static str {
        match self {
            Author::Staff => "updatedAt",
            Author::Manager => "managerUpdatedAt",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::Staff => write!(f, "staff"),
            Author::Manager => write!(f, "manager"),
        }
    }
}

/// Parse a canonical `YYYY-MM-DD` key. Anything else (missing zero padding,
/// trailing time component, impossible dates) is rejected.
pub fn parse_iso_date(date: &str) -> Option<NaiveDate> {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// One document per calendar day, keyed by its ISO date string (YYYY-MM-DD)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    /// Canonical key, always equal to the document identifier
    pub date: String,
    /// Tri-state: Some(true) available, Some(false) unavailable, None unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// Free-form time of day, no ordering enforced against `end_time`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Staff-authored note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Manager-authored note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_note: Option<String>,
    /// Last staff write, assigned by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Last manager write, assigned by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_updated_at: Option<DateTime<Utc>>,
}

impl DayRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Default::default()
        }
    }

    /// True when no content field is set. Such a record renders exactly
    /// like a date that has never been written.
    pub fn is_blank(&self) -> bool {
        self.available.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.note.is_none()
            && self.boss_note.is_none()
    }

    /// Shallow merge: fields present in the patch overwrite, all others are kept.
    pub fn apply_patch(&mut self, patch: &DayPatch) {
        if let Some(available) = patch.available {
            self.available = Some(available);
        }
        if let Some(start_time) = &patch.start_time {
            self.start_time = Some(start_time.clone());
        }
        if let Some(end_time) = &patch.end_time {
            self.end_time = Some(end_time.clone());
        }
        if let Some(note) = &patch.note {
            self.note = Some(note.clone());
        }
        if let Some(boss_note) = &patch.boss_note {
            self.boss_note = Some(boss_note.clone());
        }
    }

    /// Re-stamp the timestamp field owned by `author`
    pub fn stamp(&mut self, author: Author, now: DateTime<Utc>) {
        match author {
            Author::Staff => self.updated_at = Some(now),
            Author::Manager => self.manager_updated_at = Some(now),
        }
    }
}

/// Partial payload of a merge write. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_note: Option<String>,
}

impl DayPatch {
    /// Availability toggle plus both time fields, written together by the staff surface
    pub fn schedule(available: bool, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            available: Some(available),
            start_time: Some(start_time.into()),
            end_time: Some(end_time.into()),
            ..Default::default()
        }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Self {
            note: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn boss_note(text: impl Into<String>) -> Self {
        Self {
            boss_note: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.note.is_none()
            && self.boss_note.is_none()
    }
}

/// The singleton, date-independent manager note
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalNote {
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Inclusive range of ISO date strings. Lexical comparison is enough because
/// the format is fixed-width and zero-padded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        date >= self.start.as_str() && date <= self.end.as_str()
    }
}

/// Type of calendar cell for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CalendarDayType {
    /// Blank placeholder aligning day 1 under its weekday column
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
}

/// Visual flags derived from a day's cached record
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayFlags {
    pub available: bool,
    pub unavailable: bool,
    pub has_note: bool,
}

/// Represents a single cell of the month grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    /// Day label, 0 for padding cells
    pub day: u32,
    /// Canonical date identifier, None for padding cells
    pub date: Option<String>,
    pub day_type: CalendarDayType,
    pub selected: bool,
    pub flags: DayFlags,
}

impl CalendarDay {
    pub fn padding() -> Self {
        Self {
            day: 0,
            date: None,
            day_type: CalendarDayType::PaddingBefore,
            selected: false,
            flags: DayFlags::default(),
        }
    }
}

/// A rendered month: leading padding followed by one cell per day, no trailing fill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub year: i32,
    /// Zero-based month (0 = January)
    pub month: u32,
    /// Human-readable heading, e.g. "February 2024"
    pub label: String,
    pub weekday_header: Vec<String>,
    pub first_day_of_week: u32, // 0 = Sunday, 1 = Monday, etc.
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    /// Cells that represent actual days (padding skipped)
    pub fn month_days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days
            .iter()
            .filter(|d| d.day_type == CalendarDayType::MonthDay)
    }

    pub fn day(&self, date: &str) -> Option<&CalendarDay> {
        self.days.iter().find(|d| d.date.as_deref() == Some(date))
    }

    pub fn day_mut(&mut self, date: &str) -> Option<&mut CalendarDay> {
        self.days.iter_mut().find(|d| d.date.as_deref() == Some(date))
    }
}

/// Request body for PUT /api/days/:date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeDayRequest {
    pub author: Author,
    pub patch: DayPatch,
}

/// Request body for PUT /api/notes/global
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateGlobalNoteRequest {
    pub note: String,
}

/// Query parameters for GET /api/days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRangeQuery {
    pub start: String,
    pub end: String,
}

impl From<DayRangeQuery> for DateRange {
    fn from(query: DayRangeQuery) -> Self {
        DateRange::new(query.start, query.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_apply_patch_keeps_unrelated_fields() {
        let mut record = DayRecord::new("2024-03-05");
        record.note = Some("hi".to_string());

        record.apply_patch(&DayPatch::schedule(true, "09:00", "17:00"));

        assert_eq!(record.available, Some(true));
        assert_eq!(record.start_time.as_deref(), Some("09:00"));
        assert_eq!(record.end_time.as_deref(), Some("17:00"));
        assert_eq!(record.note.as_deref(), Some("hi"));
        assert_eq!(record.boss_note, None);
    }

    #[test]
    fn test_stamp_uses_role_field() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let mut record = DayRecord::new("2024-03-05");

        record.stamp(Author::Manager, now);
        assert_eq!(record.manager_updated_at, Some(now));
        assert_eq!(record.updated_at, None);

        record.stamp(Author::Staff, now);
        assert_eq!(record.updated_at, Some(now));
    }

    #[test]
    fn test_blank_record() {
        let mut record = DayRecord::new("2024-03-05");
        assert!(record.is_blank());

        record.note = Some(String::new());
        assert!(!record.is_blank());
    }

    #[test]
    fn test_wire_format_is_camel_case_and_sparse() {
        let mut record = DayRecord::new("2024-03-05");
        record.start_time = Some("09:00".to_string());
        record.boss_note = Some("ok".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"date": "2024-03-05", "startTime": "09:00", "bossNote": "ok"})
        );
    }

    #[test]
    fn test_missing_available_is_unknown() {
        let record: DayRecord = serde_json::from_str(r#"{"date":"2024-03-05","note":"x"}"#).unwrap();
        assert_eq!(record.available, None);

        let record: DayRecord = serde_json::from_str(r#"{"date":"2024-03-05","available":false}"#).unwrap();
        assert_eq!(record.available, Some(false));
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_iso_date("2023-02-29"), None);
        assert_eq!(parse_iso_date("2024-2-9"), None);
        assert_eq!(parse_iso_date("2024-02-29T00:00:00Z"), None);
        assert_eq!(parse_iso_date("global"), None);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new("2024-02-01", "2024-02-29");
        assert!(range.contains("2024-02-01"));
        assert!(range.contains("2024-02-29"));
        assert!(!range.contains("2024-03-01"));
        assert!(!range.contains("2024-01-31"));
    }
}

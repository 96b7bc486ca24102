//! # Day Detail Panel
//!
//! The side panel bound to one selected date. The panel itself is a two-state
//! machine (closed / open on a date); what it shows and edits is decided by a
//! role-specific [`FieldBinding`].

use shared::{Author, DayPatch, DayRecord};
use std::fmt;

/// Placeholder shown for unknown or empty values in read-only text
pub const PLACEHOLDER: &str = "—";

/// Availability text shown by the manager view when no record exists
pub const NO_DATA: &str = "No data";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    /// No date selected, panel hidden
    #[default]
    Closed,
    /// Bound to exactly one selected date
    Open { date: String },
}

impl PanelState {
    pub fn selected_date(&self) -> Option<&str> {
        match self {
            PanelState::Closed => None,
            PanelState::Open { date } => Some(date.as_str()),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PanelState::Open { .. })
    }
}

/// The set of fields a role sees and edits in the panel
pub trait FieldBinding: Default + Clone + Send + 'static {
    /// Names the individually editable fields
    type Field: Copy + Eq + fmt::Debug + Send + 'static;

    /// Whose timestamp this role's writes re-stamp
    const AUTHOR: Author;

    /// Fill the fields from a point read. `None` means no record exists.
    fn populate(&mut self, record: Option<&DayRecord>);

    /// Overwrite one field with the value held by `from`
    fn copy_field(&mut self, from: &Self, field: Self::Field);

    /// Drop from `patch` every field not listed in `edited`
    fn retain_fields(patch: &mut DayPatch, edited: &[Self::Field]);

    /// Blank the fields (panel closed, or waiting on a new read)
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Editable fields of the self-report panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffFields {
    pub available: bool,
    pub start_time: String,
    pub end_time: String,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffField {
    Available,
    StartTime,
    EndTime,
    Note,
}

impl FieldBinding for StaffFields {
    type Field = StaffField;

    const AUTHOR: Author = Author::Staff;

    fn populate(&mut self, record: Option<&DayRecord>) {
        *self = match record {
            Some(record) => Self {
                available: record.available == Some(true),
                start_time: record.start_time.clone().unwrap_or_default(),
                end_time: record.end_time.clone().unwrap_or_default(),
                note: record.note.clone().unwrap_or_default(),
            },
            None => Self::default(),
        };
    }

    fn copy_field(&mut self, from: &Self, field: StaffField) {
        match field {
            StaffField::Available => self.available = from.available,
            StaffField::StartTime => self.start_time = from.start_time.clone(),
            StaffField::EndTime => self.end_time = from.end_time.clone(),
            StaffField::Note => self.note = from.note.clone(),
        }
    }

    fn retain_fields(patch: &mut DayPatch, edited: &[StaffField]) {
        if !edited.contains(&StaffField::Available) {
            patch.available = None;
        }
        if !edited.contains(&StaffField::StartTime) {
            patch.start_time = None;
        }
        if !edited.contains(&StaffField::EndTime) {
            patch.end_time = None;
        }
        if !edited.contains(&StaffField::Note) {
            patch.note = None;
        }
        patch.boss_note = None;
    }
}

/// Manager review panel: read-only text plus the editable manager note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerFields {
    pub availability_text: String,
    pub time_text: String,
    pub note_text: String,
    pub boss_note: String,
}

impl Default for ManagerFields {
    fn default() -> Self {
        Self {
            availability_text: PLACEHOLDER.to_string(),
            time_text: PLACEHOLDER.to_string(),
            note_text: PLACEHOLDER.to_string(),
            boss_note: String::new(),
        }
    }
}

/// The manager edits only the manager note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerField {
    BossNote,
}

impl FieldBinding for ManagerFields {
    type Field = ManagerField;

    const AUTHOR: Author = Author::Manager;

    fn populate(&mut self, record: Option<&DayRecord>) {
        *self = match record {
            Some(record) => Self {
                availability_text: availability_label(record.available).to_string(),
                time_text: time_range_label(record.start_time.as_deref(), record.end_time.as_deref()),
                note_text: note_label(record.note.as_deref()),
                boss_note: record.boss_note.clone().unwrap_or_default(),
            },
            None => Self {
                availability_text: NO_DATA.to_string(),
                ..Self::default()
            },
        };
    }

    fn copy_field(&mut self, from: &Self, field: ManagerField) {
        match field {
            ManagerField::BossNote => self.boss_note = from.boss_note.clone(),
        }
    }

    fn retain_fields(patch: &mut DayPatch, edited: &[ManagerField]) {
        let boss_note = patch.boss_note.take().filter(|_| edited.contains(&ManagerField::BossNote));
        *patch = DayPatch {
            boss_note,
            ..DayPatch::default()
        };
    }
}

/// "Yes" / "No" / placeholder for unknown
pub fn availability_label(available: Option<bool>) -> &'static str {
    match available {
        Some(true) => "Yes",
        Some(false) => "No",
        None => PLACEHOLDER,
    }
}

/// `start -> end` when at least one side is set, each missing side shown as the placeholder
pub fn time_range_label(start: Option<&str>, end: Option<&str>) -> String {
    let start = start.filter(|s| !s.is_empty());
    let end = end.filter(|s| !s.is_empty());

    if start.is_none() && end.is_none() {
        return PLACEHOLDER.to_string();
    }

    format!(
        "{} -> {}",
        start.unwrap_or(PLACEHOLDER),
        end.unwrap_or(PLACEHOLDER)
    )
}

/// The staff note verbatim, or the placeholder when blank after trimming
pub fn note_label(note: Option<&str>) -> String {
    match note {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DayRecord {
        DayRecord::new("2024-03-05")
    }

    #[test]
    fn test_panel_state() {
        let closed = PanelState::default();
        assert!(!closed.is_open());
        assert_eq!(closed.selected_date(), None);

        let open = PanelState::Open { date: "2024-03-05".to_string() };
        assert!(open.is_open());
        assert_eq!(open.selected_date(), Some("2024-03-05"));
    }

    #[test]
    fn test_staff_fields_absent_record() {
        let mut fields = StaffFields {
            available: true,
            start_time: "08:00".into(),
            end_time: "12:00".into(),
            note: "stale".into(),
        };
        fields.populate(None);
        assert_eq!(fields, StaffFields::default());
    }

    #[test]
    fn test_staff_fields_verbatim() {
        let mut fields = StaffFields::default();
        let r = DayRecord {
            available: Some(true),
            start_time: Some("09:00".into()),
            end_time: Some(String::new()),
            note: Some("  spaced  ".into()),
            ..record()
        };
        fields.populate(Some(&r));

        assert!(fields.available);
        assert_eq!(fields.start_time, "09:00");
        assert_eq!(fields.end_time, "");
        assert_eq!(fields.note, "  spaced  ");
    }

    #[test]
    fn test_manager_fields_absent_record() {
        let mut fields = ManagerFields::default();
        fields.populate(None);

        assert_eq!(fields.availability_text, "No data");
        assert_eq!(fields.time_text, "—");
        assert_eq!(fields.note_text, "—");
        assert_eq!(fields.boss_note, "");
    }

    #[test]
    fn test_manager_fields_present_record() {
        let mut fields = ManagerFields::default();
        let r = DayRecord {
            available: Some(false),
            start_time: Some("09:00".into()),
            end_time: Some(String::new()),
            note: Some("dentist".into()),
            boss_note: Some(String::new()),
            ..record()
        };
        fields.populate(Some(&r));

        assert_eq!(fields.availability_text, "No");
        assert_eq!(fields.time_text, "09:00 -> —");
        assert_eq!(fields.note_text, "dentist");
        assert_eq!(fields.boss_note, "");
    }

    #[test]
    fn test_staff_retain_fields_keeps_only_edited() {
        let mut patch = DayPatch::schedule(true, "", "");
        StaffFields::retain_fields(&mut patch, &[StaffField::Available]);
        assert_eq!(
            patch,
            DayPatch {
                available: Some(true),
                ..DayPatch::default()
            }
        );
    }

    #[test]
    fn test_staff_copy_field() {
        let edited = StaffFields {
            available: true,
            start_time: "10:00".into(),
            ..StaffFields::default()
        };
        let mut loaded = StaffFields {
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            ..StaffFields::default()
        };
        loaded.copy_field(&edited, StaffField::Available);

        assert!(loaded.available);
        assert_eq!(loaded.start_time, "09:00");
        assert_eq!(loaded.end_time, "17:00");
    }

    #[test]
    fn test_manager_retain_fields() {
        let mut patch = DayPatch::boss_note("ok");
        ManagerFields::retain_fields(&mut patch, &[ManagerField::BossNote]);
        assert_eq!(patch, DayPatch::boss_note("ok"));

        ManagerFields::retain_fields(&mut patch, &[]);
        assert!(patch.is_empty());
    }

    #[test]
    fn test_availability_label() {
        assert_eq!(availability_label(Some(true)), "Yes");
        assert_eq!(availability_label(Some(false)), "No");
        assert_eq!(availability_label(None), "—");
    }

    #[test]
    fn test_time_range_label() {
        assert_eq!(time_range_label(Some("09:00"), Some("")), "09:00 -> —");
        assert_eq!(time_range_label(None, Some("17:00")), "— -> 17:00");
        assert_eq!(time_range_label(Some("09:00"), Some("17:00")), "09:00 -> 17:00");
        assert_eq!(time_range_label(Some(""), None), "—");
        assert_eq!(time_range_label(None, None), "—");
    }

    #[test]
    fn test_note_label() {
        assert_eq!(note_label(Some("  ")), "—");
        assert_eq!(note_label(None), "—");
        assert_eq!(note_label(Some(" late ")), " late ");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut fields = ManagerFields::default();
        fields.populate(Some(&DayRecord { boss_note: Some("x".into()), ..record() }));
        fields.reset();
        assert_eq!(fields, ManagerFields::default());
    }
}

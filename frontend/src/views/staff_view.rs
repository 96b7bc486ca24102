//! Self-report surface: the staff member marks availability, a time window
//! and a note for each day.

use shared::DayPatch;
use std::sync::Arc;

use crate::components::day_panel::{StaffField, StaffFields};
use crate::hooks::use_calendar::{CalendarSnapshot, CalendarSync, ViewConfig};
use crate::hooks::use_debounced_write::DebouncedWrite;
use crate::services::date_utils::{DateError, MonthRef};
use crate::services::store::DocumentStore;

fn schedule_patch(fields: &StaffFields) -> DayPatch {
    DayPatch::schedule(fields.available, &fields.start_time, &fields.end_time)
}

fn note_patch(fields: &StaffFields) -> DayPatch {
    DayPatch::note(&fields.note)
}

pub struct StaffView<S> {
    sync: CalendarSync<S, StaffFields>,
    note_write: DebouncedWrite<S, StaffFields>,
}

impl<S> StaffView<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, month: MonthRef, config: ViewConfig) -> Self {
        let sync = CalendarSync::new(store, month);
        let note_write = DebouncedWrite::new("staff-note", sync.clone(), config, note_patch);
        Self { sync, note_write }
    }

    /// Open on the month containing today
    pub fn starting_today(store: Arc<S>, config: ViewConfig) -> Self {
        Self::new(store, MonthRef::current(), config)
    }

    pub fn sync(&self) -> &CalendarSync<S, StaffFields> {
        &self.sync
    }

    pub fn snapshot(&self) -> CalendarSnapshot<StaffFields> {
        self.sync.snapshot()
    }

    pub async fn start(&self) {
        self.sync.render();
        self.sync.load_month().await;
    }

    pub async fn navigate(&self, delta: i32) {
        self.sync.navigate(delta).await;
    }

    /// Open the panel on `date`. A note still waiting to be written is
    /// written first, for the day it was typed on.
    pub async fn open_day(&self, date: &str) -> Result<(), DateError> {
        self.note_write.flush().await;
        self.sync.open_day(date).await
    }

    pub async fn close_panel(&self) {
        self.note_write.flush().await;
        self.sync.close_panel();
    }

    pub async fn set_available(&self, available: bool) {
        self.edit_schedule(StaffField::Available, |f| f.available = available)
            .await;
    }

    pub async fn set_start_time(&self, time: &str) {
        self.edit_schedule(StaffField::StartTime, |f| f.start_time = time.to_string())
            .await;
    }

    pub async fn set_end_time(&self, time: &str) {
        self.edit_schedule(StaffField::EndTime, |f| f.end_time = time.to_string())
            .await;
    }

    async fn edit_schedule(&self, field: StaffField, edit: impl FnOnce(&mut StaffFields)) {
        if self.sync.selected_date().is_none() {
            return;
        }
        self.sync.edit_field(field, edit);
        self.sync.write_with(schedule_patch).await;
    }

    /// Note keystroke: written 300 ms (by default) after typing stops
    pub fn input_note(&self, text: &str) {
        if self.sync.selected_date().is_none() {
            return;
        }
        self.sync.edit_field(StaffField::Note, |f| f.note = text.to_string());
        self.note_write.trigger();
    }

    pub fn note_write_pending(&self) -> bool {
        self.note_write.is_pending()
    }
}

//! Manager review surface: read-only view of what staff reported, one
//! editable manager note per day, and the global note.

use shared::DayPatch;
use std::sync::Arc;

use crate::components::day_panel::{ManagerField, ManagerFields};
use crate::hooks::use_calendar::{CalendarSnapshot, CalendarSync, ViewConfig};
use crate::hooks::use_debounced_write::DebouncedWrite;
use crate::services::date_utils::{DateError, MonthRef};
use crate::services::store::DocumentStore;
use crate::views::global_note::GlobalNoteEditor;

fn boss_note_patch(fields: &ManagerFields) -> DayPatch {
    DayPatch::boss_note(&fields.boss_note)
}

pub struct ManagerView<S> {
    sync: CalendarSync<S, ManagerFields>,
    boss_note_write: DebouncedWrite<S, ManagerFields>,
    global_note: GlobalNoteEditor<S>,
}

impl<S> ManagerView<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, month: MonthRef, config: ViewConfig) -> Self {
        let sync = CalendarSync::new(Arc::clone(&store), month);
        let boss_note_write = DebouncedWrite::new("boss-note", sync.clone(), config, boss_note_patch);
        Self {
            sync,
            boss_note_write,
            global_note: GlobalNoteEditor::new(store, config),
        }
    }

    /// Open on the month containing today
    pub fn starting_today(store: Arc<S>, config: ViewConfig) -> Self {
        Self::new(store, MonthRef::current(), config)
    }

    pub fn sync(&self) -> &CalendarSync<S, ManagerFields> {
        &self.sync
    }

    pub fn global_note(&self) -> &GlobalNoteEditor<S> {
        &self.global_note
    }

    pub fn snapshot(&self) -> CalendarSnapshot<ManagerFields> {
        self.sync.snapshot()
    }

    /// Render the month, then load it alongside the global note
    pub async fn start(&self) {
        self.sync.render();
        tokio::join!(self.sync.load_month(), self.global_note.load());
    }

    pub async fn navigate(&self, delta: i32) {
        self.sync.navigate(delta).await;
    }

    pub async fn open_day(&self, date: &str) -> Result<(), DateError> {
        self.boss_note_write.flush().await;
        self.sync.open_day(date).await
    }

    /// Close the panel; the manager note field is cleared with it
    pub async fn close_panel(&self) {
        self.boss_note_write.flush().await;
        self.sync.close_panel();
    }

    pub fn input_boss_note(&self, text: &str) {
        if self.sync.selected_date().is_none() {
            return;
        }
        self.sync
            .edit_field(ManagerField::BossNote, |f| f.boss_note = text.to_string());
        self.boss_note_write.trigger();
    }

    pub fn boss_note_pending(&self) -> bool {
        self.boss_note_write.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::day_panel::PLACEHOLDER;
    use crate::services::memory_store::InMemoryStore;
    use shared::{Author, DayRecord};
    use std::time::Duration;

    fn view(store: &Arc<InMemoryStore>) -> ManagerView<InMemoryStore> {
        ManagerView::new(
            Arc::clone(store),
            MonthRef::new(2024, 2).unwrap(),
            ViewConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_start_loads_month_and_global_note() {
        let store = Arc::new(InMemoryStore::new());
        store.insert(DayRecord {
            available: Some(false),
            ..DayRecord::new("2024-03-11")
        });
        store.merge_global_note("Team offsite Friday").await.unwrap();

        let view = view(&store);
        view.start().await;

        assert!(view.snapshot().grid.day("2024-03-11").unwrap().flags.unavailable);
        assert_eq!(view.global_note().text(), "Team offsite Friday");
    }

    #[tokio::test]
    async fn test_starting_today_then_previous_month() {
        let store = Arc::new(InMemoryStore::new());
        let view = ManagerView::starting_today(Arc::clone(&store), ViewConfig::default());
        assert_eq!(view.snapshot().month, MonthRef::current());

        view.navigate(-1).await;
        assert_eq!(view.snapshot().month, MonthRef::current().shift(-1));
    }

    #[tokio::test]
    async fn test_renders_staff_report_read_only() {
        let store = Arc::new(InMemoryStore::new());
        store
            .merge_day("2024-03-05", &DayPatch::schedule(true, "09:00", ""), Author::Staff)
            .await
            .unwrap();
        let view = view(&store);
        view.open_day("2024-03-05").await.unwrap();

        let fields = view.sync().fields();
        assert_eq!(fields.availability_text, "Yes");
        assert_eq!(fields.time_text, "09:00 -> —");
        assert_eq!(fields.note_text, PLACEHOLDER);
        assert_eq!(fields.boss_note, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_boss_note_is_debounced_and_stamped_for_manager() {
        let store = Arc::new(InMemoryStore::new());
        store
            .merge_day("2024-03-05", &DayPatch::note("hi"), Author::Staff)
            .await
            .unwrap();
        let staff_stamp = store.record("2024-03-05").unwrap().updated_at;

        let view = view(&store);
        view.start().await;
        view.open_day("2024-03-05").await.unwrap();
        for text in ["o", "ok", "ok!"] {
            view.input_boss_note(text);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;

        let stored = store.record("2024-03-05").unwrap();
        assert_eq!(stored.boss_note.as_deref(), Some("ok!"));
        assert_eq!(stored.note.as_deref(), Some("hi"));
        assert_eq!(stored.updated_at, staff_stamp);
        assert!(stored.manager_updated_at.is_some());
        assert_eq!(store.day_write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_clears_boss_note_after_flush() {
        let store = Arc::new(InMemoryStore::new());
        let view = view(&store);
        view.open_day("2024-03-05").await.unwrap();
        view.input_boss_note("call back");
        view.close_panel().await;

        assert_eq!(view.sync().fields().boss_note, "");
        assert_eq!(
            store.record("2024-03-05").unwrap().boss_note.as_deref(),
            Some("call back")
        );
        assert!(!view.boss_note_pending());
    }
}

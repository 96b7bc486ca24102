use shared::DayPatch;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::components::day_panel::FieldBinding;
use crate::hooks::use_calendar::{CalendarSync, ViewConfig};
use crate::hooks::use_debounce::Debouncer;
use crate::services::store::DocumentStore;

/// A debounced merge write for one free-text field of the panel
///
/// Each keystroke re-arms the timer with the date and payload current at
/// that keystroke, so the write that fires is the last input's value for
/// the date it was typed on, whatever the panel shows by then.
pub struct DebouncedWrite<S, B: FieldBinding> {
    sync: CalendarSync<S, B>,
    debouncer: Mutex<Debouncer>,
    build: fn(&B) -> DayPatch,
}

impl<S, B> DebouncedWrite<S, B>
where
    S: DocumentStore + 'static,
    B: FieldBinding,
{
    pub fn new(
        name: &'static str,
        sync: CalendarSync<S, B>,
        config: ViewConfig,
        build: fn(&B) -> DayPatch,
    ) -> Self {
        Self {
            sync,
            debouncer: Mutex::new(Debouncer::new(name, config.debounce)),
            build,
        }
    }

    fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restart the quiet period. No-op when the panel is closed.
    pub fn trigger(&self) {
        let Some((date, patch)) = self.sync.build_for_selected(self.build) else {
            return;
        };
        let sync = self.sync.clone();
        self.debouncer()
            .schedule(move || async move { sync.write_for(&date, patch).await });
    }

    /// Write now if a write is waiting to fire
    pub async fn flush(&self) {
        let was_pending = self.debouncer().cancel();
        if was_pending {
            self.sync.write_with(self.build).await;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer().is_pending()
    }
}

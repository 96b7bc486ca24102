//! Manager-only singleton note, loaded once at startup and written through
//! the same debounce policy as the per-day notes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info, warn};

use crate::hooks::use_calendar::{SaveStatus, ViewConfig};
use crate::hooks::use_debounce::Debouncer;
use crate::services::store::DocumentStore;

#[derive(Debug, Default)]
struct GlobalNoteState {
    text: String,
    save_status: SaveStatus,
    /// Bumped on every local edit so a late initial load cannot clobber typing
    edits: u64,
}

pub struct GlobalNoteEditor<S> {
    store: Arc<S>,
    state: Arc<Mutex<GlobalNoteState>>,
    debouncer: Mutex<Debouncer>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S> GlobalNoteEditor<S>
where
    S: DocumentStore + 'static,
{
    pub fn new(store: Arc<S>, config: ViewConfig) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(GlobalNoteState::default())),
            debouncer: Mutex::new(Debouncer::new("global-note", config.debounce)),
        }
    }

    pub fn text(&self) -> String {
        lock(&self.state).text.clone()
    }

    pub fn save_status(&self) -> SaveStatus {
        lock(&self.state).save_status.clone()
    }

    pub async fn load(&self) {
        let edits = lock(&self.state).edits;
        match self.store.get_global_note().await {
            Ok(note) => {
                let mut st = lock(&self.state);
                if st.edits != edits {
                    debug!("🗒️ GLOBAL NOTE: edited during load, keeping local text");
                    return;
                }
                st.text = note.map(|n| n.note).unwrap_or_default();
                info!("🗒️ GLOBAL NOTE: loaded");
            }
            Err(e) => {
                error!("Failed to load global note: {}", e);
            }
        }
    }

    pub fn input(&self, text: &str) {
        {
            let mut st = lock(&self.state);
            st.text = text.to_string();
            st.edits += 1;
        }
        let store = Arc::clone(&self.store);
        let state = Arc::clone(&self.state);
        lock(&self.debouncer).schedule(move || save(store, state));
    }

    /// Write now if a write is waiting to fire
    pub async fn flush(&self) {
        let was_pending = lock(&self.debouncer).cancel();
        if was_pending {
            save(Arc::clone(&self.store), Arc::clone(&self.state)).await;
        }
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.debouncer).is_pending()
    }
}

async fn save<S: DocumentStore>(store: Arc<S>, state: Arc<Mutex<GlobalNoteState>>) {
    let text = {
        let mut st = lock(&state);
        st.save_status = SaveStatus::Saving;
        st.text.clone()
    };

    let result = store.merge_global_note(&text).await;

    let mut st = lock(&state);
    match result {
        Ok(()) => {
            st.save_status = SaveStatus::Saved;
            debug!("🗒️ GLOBAL NOTE: saved");
        }
        Err(e) => {
            warn!("Failed to save global note: {}", e);
            st.save_status = SaveStatus::Failed(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory_store::InMemoryStore;
    use std::time::Duration;

    #[tokio::test]
    async fn test_load_missing_note_is_empty() {
        let store = Arc::new(InMemoryStore::new());
        let editor = GlobalNoteEditor::new(Arc::clone(&store), ViewConfig::default());
        editor.load().await;
        assert_eq!(editor.text(), "");
        assert_eq!(editor.save_status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_is_debounced() {
        let store = Arc::new(InMemoryStore::new());
        let editor = GlobalNoteEditor::new(Arc::clone(&store), ViewConfig::default());

        for text in ["S", "St", "Sta", "Staf", "Staff"] {
            editor.input(text);
            tokio::time::sleep(Duration::from_millis(40)).await;
        }
        assert_eq!(store.note_write_count(), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.note_write_count(), 1);
        assert_eq!(store.global_note().unwrap().note, "Staff");
        assert_eq!(editor.save_status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_load_does_not_clobber_typing() {
        let store = Arc::new(InMemoryStore::new());
        store.merge_global_note("old").await.unwrap();
        store.set_latency(shared::GLOBAL_NOTE_ID, Duration::from_millis(500));
        let editor = Arc::new(GlobalNoteEditor::new(Arc::clone(&store), ViewConfig::default()));

        let load = {
            let editor = Arc::clone(&editor);
            tokio::spawn(async move { editor.load().await })
        };
        tokio::task::yield_now().await;
        editor.input("new");
        load.await.unwrap();

        assert_eq!(editor.text(), "new");
        editor.flush().await;
        assert_eq!(store.global_note().unwrap().note, "new");
    }

    #[tokio::test]
    async fn test_failed_save_is_visible() {
        let store = Arc::new(InMemoryStore::new());
        store.set_fail_writes(true);
        let editor = GlobalNoteEditor::new(Arc::clone(&store), ViewConfig::default());
        editor.input("x");
        editor.flush().await;
        assert!(editor.save_status().is_failed());
        assert!(!editor.is_pending());
    }
}

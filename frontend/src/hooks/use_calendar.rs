//! # Calendar Sync
//!
//! Shared month-grid, cache and panel logic for both surfaces, parameterised
//! by the role's [`FieldBinding`]. `CalendarSync` is a cheap cloneable handle
//! so timers and spawned tasks can drive the same view state.
//!
//! Each month load and each point read is tagged with a generation number.
//! A completion whose generation is no longer current belongs to a month or
//! a selection the user has already left, and is dropped.

use shared::{CalendarMonth, DayPatch};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::components::calendar::{reapply_flags, refresh_day, render_month, set_selected};
use crate::components::day_panel::{FieldBinding, PanelState};
use crate::hooks::use_debounce::DEFAULT_DEBOUNCE;
use crate::services::date_utils::{parse_date_str, DateError, MonthRef};
use crate::services::store::DocumentStore;
use crate::state::month_cache::MonthCache;

/// Configuration shared by both surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    /// Quiet period before a free-text field is written
    pub debounce: Duration,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Save hint shown under the panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed(String),
}

impl SaveStatus {
    pub fn hint(&self) -> String {
        match self {
            SaveStatus::Idle => "Changes save automatically.".to_string(),
            SaveStatus::Saving => "Saving...".to_string(),
            SaveStatus::Saved => "Saved".to_string(),
            SaveStatus::Failed(reason) => format!("Save failed: {}", reason),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SaveStatus::Failed(_))
    }
}

/// Point-in-time copy of everything a surface renders
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSnapshot<B> {
    pub month: MonthRef,
    pub grid: CalendarMonth,
    pub panel: PanelState,
    pub fields: B,
    pub save_status: SaveStatus,
    pub cached_days: usize,
}

struct ViewState<B: FieldBinding> {
    month: MonthRef,
    grid: CalendarMonth,
    cache: MonthCache,
    panel: PanelState,
    fields: B,
    /// Fields the user has changed since the panel was bound to its date
    edited: Vec<B::Field>,
    /// Whether the point read for the selected date has populated the fields
    record_loaded: bool,
    save_status: SaveStatus,
    /// Writes for the current selection that have not completed
    writes_in_flight: usize,
    month_generation: u64,
    selection_generation: u64,
}

impl<B: FieldBinding> ViewState<B> {
    fn bind_panel(&mut self, panel: PanelState) {
        set_selected(&mut self.grid, panel.selected_date());
        self.panel = panel;
        self.selection_generation += 1;
        self.fields.reset();
        self.edited.clear();
        self.record_loaded = false;
        self.save_status = SaveStatus::Idle;
        self.writes_in_flight = 0;
    }
}

pub struct CalendarSync<S, B: FieldBinding> {
    store: Arc<S>,
    state: Arc<Mutex<ViewState<B>>>,
}

impl<S, B: FieldBinding> Clone for CalendarSync<S, B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<S, B> CalendarSync<S, B>
where
    S: DocumentStore + 'static,
    B: FieldBinding,
{
    pub fn new(store: Arc<S>, month: MonthRef) -> Self {
        let cache = MonthCache::new();
        let grid = render_month(month, None, &cache);
        Self {
            store,
            state: Arc::new(Mutex::new(ViewState {
                month,
                grid,
                cache,
                panel: PanelState::Closed,
                fields: B::default(),
                edited: Vec::new(),
                record_loaded: false,
                save_status: SaveStatus::Idle,
                writes_in_flight: 0,
                month_generation: 0,
                selection_generation: 0,
            })),
        }
    }

    // Never hold the guard across an await.
    fn lock(&self) -> MutexGuard<'_, ViewState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_month(&self) -> MonthRef {
        self.lock().month
    }

    pub fn snapshot(&self) -> CalendarSnapshot<B> {
        let st = self.lock();
        CalendarSnapshot {
            month: st.month,
            grid: st.grid.clone(),
            panel: st.panel.clone(),
            fields: st.fields.clone(),
            save_status: st.save_status.clone(),
            cached_days: st.cache.len(),
        }
    }

    pub fn selected_date(&self) -> Option<String> {
        self.lock().panel.selected_date().map(str::to_string)
    }

    pub fn fields(&self) -> B {
        self.lock().fields.clone()
    }

    /// Apply a user edit to one bound field
    pub fn edit_field<R>(&self, field: B::Field, edit: impl FnOnce(&mut B) -> R) -> R {
        let mut st = self.lock();
        if !st.edited.contains(&field) {
            st.edited.push(field);
        }
        edit(&mut st.fields)
    }

    pub fn save_status(&self) -> SaveStatus {
        self.lock().save_status.clone()
    }

    /// Rebuild the grid for the current month from the cache
    pub fn render(&self) {
        let mut st = self.lock();
        let grid = render_month(st.month, st.panel.selected_date(), &st.cache);
        st.grid = grid;
    }

    /// Move by `delta` months and load the new month
    pub async fn navigate(&self, delta: i32) {
        let target = self.current_month().shift(delta);
        self.go_to(target).await;
    }

    pub async fn go_to(&self, month: MonthRef) {
        {
            let mut st = self.lock();
            st.month = month;
            st.cache.clear();
        }
        info!("🗓️ CALENDAR: showing {}", month);
        self.render();
        self.load_month().await;
    }

    /// Replace the cache with the visible month's records and re-flag the grid.
    ///
    /// Query failures are logged and the grid keeps whatever flags it had.
    pub async fn load_month(&self) {
        let (month, generation) = {
            let mut st = self.lock();
            st.cache.clear();
            st.month_generation += 1;
            (st.month, st.month_generation)
        };

        let range = month.range();
        debug!("🗓️ CALENDAR: loading {} ({} to {})", month, range.start, range.end);

        match self.store.query_days(&range).await {
            Ok(records) => {
                let mut st = self.lock();
                if st.month_generation != generation {
                    debug!("🗓️ CALENDAR: discarding stale load of {}", month);
                    return;
                }
                let count = records.len();
                st.cache.populate(records);
                let ViewState { grid, cache, .. } = &mut *st;
                reapply_flags(grid, cache);
                info!("🗓️ CALENDAR: loaded {} records for {}", count, month);
            }
            Err(e) => {
                error!("Failed to load {}: {}", month, e);
            }
        }
    }

    /// Bind the panel to `date` and populate it from a point read.
    ///
    /// A blank record is shown the same as a missing one. If the selection
    /// changes before the read lands, the read is dropped. Fields the user
    /// edited while the read was in flight keep the edited value.
    pub async fn open_day(&self, date: &str) -> Result<(), DateError> {
        parse_date_str(date)?;

        let generation = {
            let mut st = self.lock();
            st.bind_panel(PanelState::Open {
                date: date.to_string(),
            });
            st.selection_generation
        };
        info!("📝 PANEL: opened {}", date);

        match self.store.get_day(date).await {
            Ok(record) => {
                let mut st = self.lock();
                if st.selection_generation != generation {
                    debug!("📝 PANEL: discarding stale read of {}", date);
                    return Ok(());
                }
                let record = record.filter(|r| !r.is_blank());
                let mut loaded = B::default();
                loaded.populate(record.as_ref());
                for &field in &st.edited {
                    debug!("📝 PANEL: keeping edited {:?} on {}", field, date);
                    loaded.copy_field(&st.fields, field);
                }
                st.fields = loaded;
                st.record_loaded = true;
            }
            Err(e) => {
                error!("Failed to read {}: {}", date, e);
            }
        }
        Ok(())
    }

    pub fn close_panel(&self) {
        let mut st = self.lock();
        let Some(date) = st.panel.selected_date().map(str::to_string) else {
            return;
        };
        st.bind_panel(PanelState::Closed);
        info!("📝 PANEL: closed {}", date);
    }

    /// Build a patch from the current fields, paired with the selected date.
    /// `None` when the panel is closed.
    pub fn build_for_selected(&self, build: impl FnOnce(&B) -> DayPatch) -> Option<(String, DayPatch)> {
        let st = self.lock();
        let date = st.panel.selected_date()?;
        Some((date.to_string(), build(&st.fields)))
    }

    pub async fn write(&self, patch: DayPatch) {
        self.write_with(move |_| patch).await;
    }

    /// Build a patch from the current fields and write it for the selected date.
    /// No-op when the panel is closed.
    pub async fn write_with(&self, build: impl FnOnce(&B) -> DayPatch) {
        match self.build_for_selected(build) {
            Some((date, patch)) => self.write_for(&date, patch).await,
            None => debug!("💾 SYNC: no date selected, write skipped"),
        }
    }

    /// Merge-write `patch` for `date` and, on success, write it through to
    /// the cache and re-flag the cell if that date is on the visible month.
    ///
    /// Until the selected date's record has been read, only fields the user
    /// edited are sent, so stored values the panel has not seen yet survive.
    /// The save hint follows writes for the current selection only.
    pub async fn write_for(&self, date: &str, mut patch: DayPatch) {
        let (generation, tracked) = {
            let mut st = self.lock();
            let tracked = st.panel.selected_date() == Some(date);
            if tracked && !st.record_loaded {
                B::retain_fields(&mut patch, &st.edited);
            }
            if patch.is_empty() {
                return;
            }
            if tracked {
                st.writes_in_flight += 1;
                st.save_status = SaveStatus::Saving;
            }
            (st.selection_generation, tracked)
        };

        let result = self.store.merge_day(date, &patch, B::AUTHOR).await;

        let mut st = self.lock();
        let current = tracked && st.selection_generation == generation;
        if current {
            st.writes_in_flight = st.writes_in_flight.saturating_sub(1);
        }
        match result {
            Ok(()) => {
                if current && st.writes_in_flight == 0 {
                    st.save_status = SaveStatus::Saved;
                }
                if st.month.contains(date) {
                    let ViewState { grid, cache, .. } = &mut *st;
                    cache.merge_written(date, &patch);
                    refresh_day(grid, cache, date);
                }
                debug!("💾 SYNC: saved {} as {}", date, B::AUTHOR);
            }
            Err(e) => {
                warn!("Failed to save {}: {}", date, e);
                if current {
                    st.save_status = SaveStatus::Failed(e.to_string());
                }
            }
        }
    }
}

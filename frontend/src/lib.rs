//! # Availability front end
//!
//! Headless core of the two calendar surfaces. The staff surface lets a
//! staff member declare availability, a time window and a note per day;
//! the manager surface reviews those reports, adds a manager note per day
//! and edits one global note.
//!
//! Both surfaces share [`hooks::use_calendar::CalendarSync`], which owns
//! the rendered month grid, the month cache and the day panel, and talks
//! to a [`services::store::DocumentStore`]. The rendering layer reads
//! [`hooks::use_calendar::CalendarSnapshot`]s and forwards user events to
//! the view methods.

pub mod components;
pub mod hooks;
pub mod services;
pub mod state;
pub mod views;

pub use hooks::use_calendar::{CalendarSnapshot, CalendarSync, SaveStatus, ViewConfig};
pub use services::api::ApiClient;
pub use services::date_utils::{DateError, MonthRef};
pub use services::memory_store::InMemoryStore;
pub use services::store::{DocumentStore, StoreError};
pub use views::global_note::GlobalNoteEditor;
pub use views::manager_view::ManagerView;
pub use views::staff_view::StaffView;

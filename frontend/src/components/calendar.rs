//! # Calendar Renderer
//!
//! Builds the month grid: leading padding cells so day 1 sits under its
//! weekday column, then one cell per day, with no trailing fill. Every
//! render replaces the whole grid; a month never has more than 31 cells.
//!
//! Visual flags are a pure function of the cached record and are
//! re-applied in place when the cache changes, without rebuilding the grid.

use shared::{CalendarDay, CalendarDayType, CalendarMonth, DayFlags, DayRecord};
use tracing::debug;

use crate::services::date_utils::{MonthRef, WEEKDAY_HEADER};
use crate::state::month_cache::MonthCache;

/// Derive the availability/note flags for one date.
///
/// `available` and `unavailable` follow the tri-state field exactly, so an
/// unknown availability sets neither. `has_note` is set when either note is
/// non-empty after trimming.
pub fn day_flags(record: Option<&DayRecord>) -> DayFlags {
    let Some(record) = record else {
        return DayFlags::default();
    };

    DayFlags {
        available: record.available == Some(true),
        unavailable: record.available == Some(false),
        has_note: has_text(record.note.as_deref()) || has_text(record.boss_note.as_deref()),
    }
}

fn has_text(text: Option<&str>) -> bool {
    text.is_some_and(|t| !t.trim().is_empty())
}

/// Render a full month grid
pub fn render_month(month: MonthRef, selected: Option<&str>, cache: &MonthCache) -> CalendarMonth {
    let first_day = month.first_weekday();
    let days_in_month = month.days_in_month();

    debug!(
        "🗓️ CALENDAR: rendering {} ({} padding, {} days)",
        month, first_day, days_in_month
    );

    let mut days = Vec::with_capacity((first_day + days_in_month) as usize);
    days.extend((0..first_day).map(|_| CalendarDay::padding()));

    for day in 1..=days_in_month {
        let date = month.date_str(day);
        days.push(CalendarDay {
            day,
            selected: selected == Some(date.as_str()),
            flags: day_flags(cache.get(&date)),
            date: Some(date),
            day_type: CalendarDayType::MonthDay,
        });
    }

    CalendarMonth {
        year: month.year(),
        month: month.month0(),
        label: month.label(),
        weekday_header: WEEKDAY_HEADER.iter().map(|d| d.to_string()).collect(),
        first_day_of_week: first_day,
        days,
    }
}

/// Re-evaluate every rendered day against the cache
pub fn reapply_flags(grid: &mut CalendarMonth, cache: &MonthCache) {
    for cell in grid.days.iter_mut() {
        if let Some(date) = cell.date.as_deref() {
            cell.flags = day_flags(cache.get(date));
        }
    }
}

/// Re-evaluate a single rendered day. Returns false if the date is not on the grid.
pub fn refresh_day(grid: &mut CalendarMonth, cache: &MonthCache, date: &str) -> bool {
    match grid.day_mut(date) {
        Some(cell) => {
            cell.flags = day_flags(cache.get(date));
            true
        }
        None => false,
    }
}

/// Mark exactly the cell for `selected` (or none)
pub fn set_selected(grid: &mut CalendarMonth, selected: Option<&str>) {
    for cell in grid.days.iter_mut() {
        cell.selected = cell.date.is_some() && cell.date.as_deref() == selected;
    }
}

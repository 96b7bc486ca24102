pub mod calendar;
pub mod day_panel;

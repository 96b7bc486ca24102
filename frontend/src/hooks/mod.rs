pub mod use_calendar;
pub mod use_debounce;
pub mod use_debounced_write;

pub mod api;
pub mod date_utils;
pub mod memory_store;
pub mod store;

pub mod month_cache;

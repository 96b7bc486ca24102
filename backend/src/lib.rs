//! # Availability backend
//!
//! Document store for the availability calendar: one JSON document per
//! date in SQLite plus the singleton global note, served over a small REST
//! API. Writes are merges; each author role stamps its own timestamp.

use anyhow::Result;
use axum::Router;
use tracing::info;

pub mod config;
pub mod db;
pub mod domain;
pub mod rest;

pub use config::ServerConfig;
pub use db::DbConnection;
pub use domain::{DayService, ServiceError};
pub use rest::AppState;

/// Open the database and build the API router
pub async fn initialize_backend(config: &ServerConfig) -> Result<Router> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;
    Ok(build_app(db, config))
}

pub fn build_app(db: DbConnection, config: &ServerConfig) -> Router {
    let state = AppState::new(DayService::new(db));
    rest::router(state, config.allowed_origin.clone())
}

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;

use crate::db::DEFAULT_DATABASE_URL;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

/// Server settings, read from `AVAILABILITY_*` environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub addr: SocketAddr,
    pub allowed_origin: HeaderValue,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; unset keys fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            lookup("AVAILABILITY_DB_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let addr = lookup("AVAILABILITY_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse::<SocketAddr>()
            .with_context(|| format!("AVAILABILITY_ADDR is not a socket address: {}", addr))?;

        let origin = lookup("AVAILABILITY_ALLOWED_ORIGIN")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());
        let allowed_origin = HeaderValue::from_str(&origin)
            .with_context(|| format!("AVAILABILITY_ALLOWED_ORIGIN is not a valid origin: {}", origin))?;

        Ok(Self {
            database_url,
            addr,
            allowed_origin,
        })
    }
}

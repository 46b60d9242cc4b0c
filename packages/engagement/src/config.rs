use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::kernel::WritePolicy;

/// Engagement configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Only needed by the Postgres-backed store.
    pub database_url: Option<String>,
    pub max_write_attempts: u32,
    pub db_max_connections: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok(),
            max_write_attempts: parse_var(
                "ENGAGEMENT_MAX_WRITE_ATTEMPTS",
                WritePolicy::DEFAULT_MAX_ATTEMPTS,
            )?,
            db_max_connections: parse_var("ENGAGEMENT_DB_MAX_CONNECTIONS", 10)?,
        })
    }

    pub fn write_policy(&self) -> WritePolicy {
        WritePolicy::new(self.max_write_attempts)
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set")
    }
}

fn parse_var(name: &str, default: u32) -> Result<u32> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

use crate::services::story_service::MAX_TTL_HOURS;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `REQUEST_TIMEOUT_SECS` (optional): per-request timeout, defaults to 10
/// - `STORY_TTL_HOURS` (optional): story lifetime, defaults to 24
/// - `STORY_PURGE_INTERVAL_SECS` (optional): expired story sweep, defaults to 300
/// - `CHAT_CHANNEL_CAPACITY` (optional): realtime buffer per subscriber, defaults to 256
/// - `ADMIN_BOOTSTRAP_KEY` (optional): admin key registered on startup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_story_ttl")]
    pub story_ttl_hours: i64,

    #[serde(default = "default_purge_interval")]
    pub story_purge_interval_secs: u64,

    #[serde(default = "default_chat_capacity")]
    pub chat_channel_capacity: usize,

    #[serde(default)]
    pub admin_bootstrap_key: Option<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_story_ttl() -> i64 {
    24
}

fn default_purge_interval() -> u64 {
    300
}

fn default_chat_capacity() -> usize {
    256
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: database_url -> DATABASE_URL
        envy::from_env::<Config>()
    }

    /// Reject settings that would make the service fail on every request
    /// that relies on them.
    ///
    /// # Errors
    ///
    /// - `STORY_TTL_HOURS` outside 1..=168
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=MAX_TTL_HOURS).contains(&self.story_ttl_hours) {
            anyhow::bail!(
                "STORY_TTL_HOURS must be between 1 and {}, got {}",
                MAX_TTL_HOURS,
                self.story_ttl_hours
            );
        }

        Ok(())
    }
}

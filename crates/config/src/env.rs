use serde::Deserialize;
use sprintlens_common::error::{SprintlensError, SprintlensResult};
use std::env;

/// Service-level settings. Tracker credentials are NOT part of this config:
/// they arrive per-request from the embedding application.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub jira_timeout_secs: u64,
    pub jira_max_retries: u32,
    pub jira_max_results: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads vars with defaults.
    pub fn from_env() -> SprintlensResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: get_var_or("HOST", "0.0.0.0"),
            port: parse_var_or("PORT", 3001)?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            jira_timeout_secs: parse_var_or("JIRA_TIMEOUT_SECS", 30)?,
            jira_max_retries: parse_var_or("JIRA_MAX_RETRIES", 3)?,
            jira_max_results: parse_var_or("JIRA_MAX_RESULTS", 100)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_var_or<T: std::str::FromStr>(key: &str, default: T) -> SprintlensResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| SprintlensError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

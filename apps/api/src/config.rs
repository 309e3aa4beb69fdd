use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::batch::BatchOptions;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or numeric values are invalid.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Completion calls in flight per batch.
    pub max_concurrency: usize,
    pub call_timeout_secs: u64,
    /// Default segment size in characters, overridable per request.
    pub max_segment_size: usize,
    /// Default reduce fan-in, overridable per request.
    pub fan_in: usize,
    pub max_depth_budget: usize,
    pub max_breadth: usize,
    /// Body cap for summary requests and uploads.
    pub max_upload_bytes: usize,
    /// How long finished runs stay queryable.
    pub run_retention_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_concurrency: parse_env("MAX_CONCURRENCY", 4)?,
            call_timeout_secs: parse_env("CALL_TIMEOUT_SECS", 120)?,
            max_segment_size: parse_env("MAX_SEGMENT_SIZE", 12_000)?,
            fan_in: parse_env("FAN_IN", 4)?,
            max_depth_budget: parse_env("MAX_DEPTH_BUDGET", 8)?,
            max_breadth: parse_env("MAX_BREADTH", 5)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 32 * 1024 * 1024)?,
            run_retention_secs: parse_env("RUN_RETENTION_SECS", 3600)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            bail!("MAX_CONCURRENCY must be at least 1");
        }
        if self.call_timeout_secs == 0 {
            bail!("CALL_TIMEOUT_SECS must be at least 1");
        }
        if self.max_segment_size == 0 {
            bail!("MAX_SEGMENT_SIZE must be at least 1");
        }
        if self.fan_in < 2 {
            bail!("FAN_IN must be at least 2");
        }
        if self.max_depth_budget == 0 || self.max_breadth == 0 {
            bail!("MAX_DEPTH_BUDGET and MAX_BREADTH must be at least 1");
        }
        if self.max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be at least 1");
        }
        Ok(())
    }

    pub fn run_retention(&self) -> Duration {
        Duration::from_secs(self.run_retention_secs)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new(
            self.max_concurrency,
            Some(Duration::from_secs(self.call_timeout_secs)),
        )
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .ok()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Defaults without touching the process environment.
    pub fn for_tests() -> Self {
        Config {
            anthropic_api_key: "test-key".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            max_concurrency: 4,
            call_timeout_secs: 120,
            max_segment_size: 12_000,
            fan_in: 4,
            max_depth_budget: 8,
            max_breadth: 5,
            max_upload_bytes: 32 * 1024 * 1024,
            run_retention_secs: 3600,
        }
    }
}

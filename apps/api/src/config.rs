use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::backoff::BackoffPolicy;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Application configuration loaded from environment variables.
/// Only the API key is required; everything else has a provider-safe default.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub rate_limit_per_minute: u32,
    pub retry_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_multiplier: f64,
    pub backoff_max_ms: u64,
    pub pipeline_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so parsing can be exercised
    /// without mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            gemini_api_key: lookup("GEMINI_API_KEY")
                .filter(|v| !v.trim().is_empty())
                .context("Required environment variable 'GEMINI_API_KEY' is not set")?,
            gemini_model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            rate_limit_per_minute: parse_or(&lookup, "MODEL_RATE_LIMIT_RPM", 60)?,
            retry_attempts: parse_or(&lookup, "MODEL_RETRY_ATTEMPTS", 3)?,
            backoff_base_ms: parse_or(&lookup, "MODEL_BACKOFF_BASE_MS", 2_000)?,
            backoff_multiplier: parse_or(&lookup, "MODEL_BACKOFF_MULTIPLIER", 2.0)?,
            backoff_max_ms: parse_or(&lookup, "MODEL_BACKOFF_MAX_MS", 10_000)?,
            pipeline_timeout_secs: parse_or(&lookup, "PIPELINE_TIMEOUT_SECS", 120)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        anyhow::ensure!(
            config.rate_limit_per_minute > 0,
            "MODEL_RATE_LIMIT_RPM must be at least 1"
        );
        anyhow::ensure!(
            config.retry_attempts > 0,
            "MODEL_RETRY_ATTEMPTS must be at least 1"
        );
        anyhow::ensure!(
            config.backoff_multiplier.is_finite() && config.backoff_multiplier >= 1.0,
            "MODEL_BACKOFF_MULTIPLIER must be a finite number >= 1.0"
        );
        anyhow::ensure!(
            config.pipeline_timeout_secs > 0,
            "PIPELINE_TIMEOUT_SECS must be at least 1"
        );

        Ok(config)
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: self.retry_attempts,
            base_delay: Duration::from_millis(self.backoff_base_ms),
            multiplier: self.backoff_multiplier,
            max_delay: Duration::from_millis(self.backoff_max_ms),
            jitter: true,
        }
    }

    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

//! Environment-derived configuration, read once at startup.
//!
//! Both binaries load `.env` through `dotenvy` and then build one of these
//! structs. Nothing below the binaries touches the process environment.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be set")]
    Missing { key: &'static str },

    #[error("{key} is not in the correct format: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Look up `key`, treating empty values as unset
fn lookup<F>(get: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_or<F, T>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(get, key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Settings for the stats API server
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: Ipv4Addr,
    pub port: u16,
    pub data_url: Option<String>,
    pub data_path: PathBuf,
    pub cors_origin: String,
}

impl ApiConfig {
    pub const DEFAULT_DATA_PATH: &'static str = "data/games_2024_25.json";
    pub const DEFAULT_CORS_ORIGIN: &'static str = "http://localhost:3000";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            host: parse_or(&get, "HOST", Ipv4Addr::LOCALHOST)?,
            port: parse_or(&get, "PORT", 8000)?,
            data_url: lookup(&get, "DATA_URL"),
            data_path: lookup(&get, "DATA_PATH")
                .unwrap_or_else(|| Self::DEFAULT_DATA_PATH.to_string())
                .into(),
            cors_origin: lookup(&get, "CORS_ORIGIN")
                .unwrap_or_else(|| Self::DEFAULT_CORS_ORIGIN.to_string()),
        })
    }
}

/// Which upstream stats service the fetcher talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    BallDontLie,
    ApiSports,
}

impl ProviderKind {
    pub fn default_base(&self) -> &'static str {
        match self {
            ProviderKind::BallDontLie => "https://api.balldontlie.io/v1",
            ProviderKind::ApiSports => "https://v2.nba.api-sports.io",
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "balldontlie" => Ok(ProviderKind::BallDontLie),
            "api-sports" | "apisports" => Ok(ProviderKind::ApiSports),
            _ => Err(()),
        }
    }
}

/// Retry and pacing knobs for provider requests
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff unit; the n-th retry waits `n * backoff`
    pub backoff: Duration,
    /// Pause between consecutive pages
    pub page_delay: Duration,
}

impl RetryPolicy {
    /// Wait before the `retry`-th retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.backoff * retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Duration::from_millis(1000),
            page_delay: Duration::from_millis(200),
        }
    }
}

/// Settings for the offline fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub provider: ProviderKind,
    pub api_base: String,
    pub api_key: String,
    pub player_name: String,
    /// Season start year, e.g. 2024 for 2024-25
    pub season: u16,
    pub out_path: PathBuf,
    pub retry: RetryPolicy,
}

impl FetchConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match lookup(&get, "STATS_PROVIDER") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "STATS_PROVIDER",
                value,
            })?,
            None => ProviderKind::BallDontLie,
        };

        let api_key = lookup(&get, "PROVIDER_API_KEY")
            .ok_or(ConfigError::Missing { key: "PROVIDER_API_KEY" })?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: parse_or(&get, "FETCH_MAX_RETRIES", defaults.max_retries)?,
            backoff: Duration::from_millis(parse_or(
                &get,
                "FETCH_BACKOFF_MS",
                defaults.backoff.as_millis() as u64,
            )?),
            page_delay: Duration::from_millis(parse_or(
                &get,
                "FETCH_PAGE_DELAY_MS",
                defaults.page_delay.as_millis() as u64,
            )?),
        };

        Ok(Self {
            provider,
            api_base: lookup(&get, "PROVIDER_API_BASE")
                .unwrap_or_else(|| provider.default_base().to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            player_name: lookup(&get, "PLAYER_NAME").unwrap_or_else(|| "Rui Hachimura".to_string()),
            season: parse_or(&get, "SEASON", 2024)?,
            out_path: lookup(&get, "OUT_PATH")
                .unwrap_or_else(|| "docs/data/games.json".to_string())
                .into(),
            retry,
        })
    }
}

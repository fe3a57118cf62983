//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup; a `.env` file is honoured for local
//! development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Directory backing the durable storage tier.
    /// `None` keeps durable data in memory (tests only).
    pub data_dir: Option<PathBuf>,
    /// Simulated credential check latency
    pub login_latency: Duration,
    /// Simulated token refresh latency
    pub refresh_latency: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            data_dir: Some(PathBuf::from("data")),
            login_latency: Duration::from_millis(1000),
            refresh_latency: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            port: parse_var("PORT")?.unwrap_or(defaults.port),
            data_dir: Some(
                env::var("FLOURISH_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("data")),
            ),
            login_latency: parse_var("LOGIN_LATENCY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.login_latency),
            refresh_latency: parse_var("REFRESH_LATENCY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.refresh_latency),
        })
    }

    /// Config for tests: no simulated latency, in-memory durable tier.
    pub fn test_default() -> Self {
        Self {
            data_dir: None,
            login_latency: Duration::ZERO,
            refresh_latency: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Read and parse an optional environment variable.
fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

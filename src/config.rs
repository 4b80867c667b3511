//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use serde::Deserialize;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Docker
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3001".to_string()],
        }
    }
}

/// Analysis engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Worker count of the batch pool
    pub batch_concurrency: usize,
    /// Per-table estimator deadline
    pub estimator_timeout_ms: u64,
    /// Artificial latency of the built-in estimator
    pub estimator_latency_ms: u64,
    /// Finished batches kept in memory
    pub batch_retention: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: 4,
            estimator_timeout_ms: 10_000,
            estimator_latency_ms: 0,
            batch_retention: 100,
        }
    }
}

impl AnalysisConfig {
    pub fn estimator_timeout(&self) -> Duration {
        Duration::from_millis(self.estimator_timeout_ms)
    }

    pub fn estimator_latency(&self) -> Duration {
        Duration::from_millis(self.estimator_latency_ms)
    }
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub analysis: AnalysisConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let server = ServerConfig {
            host: parse_or(&lookup, "HOST", defaults.server.host)?,
            port: parse_or(&lookup, "PORT", defaults.server.port)?,
        };

        let cors = CorsConfig {
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors.allowed_origins),
        };

        let batch_concurrency: usize =
            parse_or(&lookup, "BATCH_CONCURRENCY", defaults.analysis.batch_concurrency)?;
        if batch_concurrency == 0 {
            return Err(ConfigError::InvalidValue(
                "BATCH_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let analysis = AnalysisConfig {
            batch_concurrency,
            estimator_timeout_ms: parse_or(
                &lookup,
                "ESTIMATOR_TIMEOUT_MS",
                defaults.analysis.estimator_timeout_ms,
            )?,
            estimator_latency_ms: parse_or(
                &lookup,
                "ESTIMATOR_LATENCY_MS",
                defaults.analysis.estimator_latency_ms,
            )?,
            batch_retention: parse_or(
                &lookup,
                "BATCH_RETENTION",
                defaults.analysis.batch_retention,
            )?,
        };

        Ok(Self {
            server,
            cors,
            analysis,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{}={:?}", key, raw))),
        _ => Ok(default),
    }
}

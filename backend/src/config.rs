//! Configuration management for the Fingerling Distribution Tracking System
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with FDTS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// External prediction service
    pub prediction: PredictionConfig,

    /// Report tuning
    pub reports: ReportsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,

    /// Directory served publicly; uploads land in `<public_dir>/uploads`
    pub public_dir: String,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionConfig {
    /// Prediction API endpoint
    pub endpoint: String,

    /// Optional API key sent as `x-api-key`
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Days after which a batch with stock left is overdue
    pub overdue_after_days: i64,

    /// Length of the municipality/province leaderboards
    pub top_n: i64,

    /// Number of monthly trend buckets returned by the stats report
    pub monthly_buckets: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FDTS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.public_dir", "public")?
            .set_default("server.max_upload_bytes", 2 * 1024 * 1024)?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default(
                "prediction.endpoint",
                "https://fingerling-prediction.onrender.com/predict",
            )?
            .set_default("prediction.timeout_secs", 30)?
            .set_default("reports.overdue_after_days", 30)?
            .set_default("reports.top_n", 10)?
            .set_default("reports.monthly_buckets", 12)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FDTS_ prefix)
            .add_source(
                Environment::with_prefix("FDTS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Directory uploaded images are written to
    pub fn upload_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.server.public_dir).join("uploads")
    }
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            overdue_after_days: shared::DEFAULT_OVERDUE_AFTER_DAYS,
            top_n: 10,
            monthly_buckets: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_defaults() {
        let reports = ReportsConfig::default();
        assert_eq!(reports.overdue_after_days, 30);
        assert_eq!(reports.top_n, 10);
        assert_eq!(reports.monthly_buckets, 12);
    }
}

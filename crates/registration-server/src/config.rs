//! Configuration for the registration service.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application mode
    #[serde(default)]
    pub app: AppConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Registration storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Registration window
    #[serde(default)]
    pub registration: RegistrationConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// `development` or `production`
    #[serde(default)]
    pub environment: Environment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the registry file
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Enable persistence (if false, registrations are in-memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// First day submissions are accepted (YYYY-MM-DD)
    #[serde(default = "default_opens_on")]
    pub opens_on: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            persist: true,
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            opens_on: default_opens_on(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    5000
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("inscricoes.json")
}

fn default_true() -> bool {
    true
}

fn default_opens_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 1).unwrap_or_default()
}

fn default_global_rpm() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_env_source(config::Environment::default())
    }

    pub(crate) fn from_env_source(source: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(source.separator("__").try_parsing(false))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == Environment::Production
    }
}

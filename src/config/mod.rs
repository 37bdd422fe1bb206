//! # Hydration Configuration
//!
//! Defaults for result sets created by the engine, plus the logging and
//! snapshot settings that surround it. Profiles mirror the usual
//! development/test/production split; [`loader::ConfigLoader`] layers a
//! TOML file and `HYDRATOR__*` environment variables on top.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hydrator_core::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::load(None)?;
//! config.log_configuration();
//! # Ok(())
//! # }
//! ```

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::{HydrationError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::info;

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrationConfig {
    /// Whether result sets cache records and allow rewinding
    pub buffer_results: bool,
    /// Whether grouped records are turned into entities
    pub hydrate: bool,
    pub logging: LoggingConfig,
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Empty means the environment's default level
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub pretty: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for HydrationConfig {
    /// Production defaults
    fn default() -> Self {
        Self {
            buffer_results: true,
            hydrate: true,
            logging: LoggingConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

impl HydrationConfig {
    /// Test configuration: verbose logs, readable snapshots
    pub fn for_test() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: false,
            },
            snapshot: SnapshotConfig { pretty: true },
            ..Self::default()
        }
    }

    pub fn for_development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                json: false,
            },
            ..Self::default()
        }
    }

    /// Production logging goes out as JSON
    pub fn for_production() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                json: true,
            },
            ..Self::default()
        }
    }

    /// Configuration profile for the detected environment
    pub fn for_environment(environment: &str) -> Self {
        match environment {
            "test" => Self::for_test(),
            "development" => Self::for_development(),
            "production" => Self::for_production(),
            _ => Self::default(),
        }
    }

    /// Load the profile for the current environment
    pub fn from_environment() -> Self {
        let environment = detect_environment();
        info!(environment = %environment, "Loading hydration configuration profile");
        Self::for_environment(&environment)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !level.is_empty() && !LOG_LEVELS.contains(&level.as_str()) {
            return Err(HydrationError::Configuration(format!(
                "Unknown log level '{}', expected one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Log current configuration for debugging
    pub fn log_configuration(&self) {
        info!("Hydration Configuration:");
        info!("  Buffer results: {}", self.buffer_results);
        info!("  Hydrate entities: {}", self.hydrate);
        info!(
            "  Logging: level={}, json={}",
            self.logging.level, self.logging.json
        );
        info!("  Pretty snapshots: {}", self.snapshot.pretty);
    }
}

/// Current environment name: `HYDRATOR_ENV`, then `APP_ENV`, defaulting to
/// `development`.
pub fn detect_environment() -> String {
    env::var("HYDRATOR_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. the profile for the detected environment
//! 2. an optional TOML file
//! 3. `HYDRATOR__*` environment variables, e.g. `HYDRATOR__LOGGING__LEVEL=warn`

use super::{detect_environment, HydrationConfig};
use crate::error::{HydrationError, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Default prefix for environment overrides.
pub const ENV_PREFIX: &str = "HYDRATOR";

/// Separator between the prefix and nested keys in override variables.
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    environment: String,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            environment: detect_environment(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration for the detected environment, optionally merging
    /// a TOML file.
    pub fn load(path: Option<&Path>) -> Result<HydrationConfig> {
        Self::new().load_from(path)
    }

    /// Use an explicit environment profile instead of detecting one
    pub fn with_environment(mut self, environment: &str) -> Self {
        self.environment = environment.to_string();
        self
    }

    /// Read overrides from `<prefix>__*` variables instead of `HYDRATOR__*`
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn load_from(&self, path: Option<&Path>) -> Result<HydrationConfig> {
        let profile = HydrationConfig::for_environment(&self.environment);
        let mut builder = Config::builder().add_source(Config::try_from(&profile)?);

        if let Some(path) = path {
            if !path.is_file() {
                return Err(HydrationError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            debug!(path = %path.display(), "Merging configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(&self.env_prefix)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

        let config: HydrationConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            environment = %self.environment,
            buffer_results = config.buffer_results,
            hydrate = config.hydrate,
            log_level = %config.logging.level,
            "Configuration loaded successfully"
        );
        Ok(config)
    }
}

use super::{BridgeConfig, ConfigPaths};

use crate::{BridgeError, Result};

use std::{fs, path::Path};
use tracing::{debug, info};

impl BridgeConfig {
    /// Loads the configuration file
    ///
    /// With no explicit `path` the XDG location is used, and a missing file
    /// there yields the defaults. An explicit path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicit configuration file does not exist or cannot be read
    /// - The TOML content is invalid
    /// - A value fails validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(BridgeError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => {
                let path = ConfigPaths::main_config()?;
                if !path.exists() {
                    debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml(&content, Some(&path))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the TOML is invalid or a value fails validation
    pub fn from_toml(content: &str, path: Option<&Path>) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| BridgeError::toml_parse(e, path))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints serde cannot express
    ///
    /// # Errors
    /// Returns `BridgeError::Config` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, reason: &str| {
            Err(BridgeError::Config(format!("invalid {field}: {reason}")))
        };

        let session = &self.session;
        if session.endpoint.trim().is_empty() || !session.endpoint.contains(':') {
            return invalid("session.endpoint", "expected host:port");
        }
        if session.client_name.trim().is_empty() {
            return invalid("session.client_name", "must not be empty");
        }
        if session.connect_timeout_ms == 0 {
            return invalid("session.connect_timeout_ms", "must be greater than 0");
        }
        if session.liveness_timeout_ms == Some(0) {
            return invalid("session.liveness_timeout_ms", "must be greater than 0");
        }

        if self.mpris.name.trim().is_empty() {
            return invalid("mpris.name", "must not be empty");
        }

        let reconnect = &self.reconnect;
        if reconnect.initial_delay_ms == 0 {
            return invalid("reconnect.initial_delay_ms", "must be greater than 0");
        }
        if reconnect.max_delay_ms < reconnect.initial_delay_ms {
            return invalid(
                "reconnect.max_delay_ms",
                "must not be smaller than initial_delay_ms",
            );
        }
        if !reconnect.multiplier.is_finite() || reconnect.multiplier < 1.0 {
            return invalid("reconnect.multiplier", "must be a finite number >= 1.0");
        }
        if reconnect.initial_attempts == Some(0) {
            return invalid("reconnect.initial_attempts", "must be greater than 0");
        }

        Ok(())
    }
}

//! Configuration schema, loading and validation.
//!
//! The bridge reads one TOML file with four sections, all optional:
//! `[general]`, `[session]`, `[mpris]` and `[reconnect]`.

mod general;
mod loading;
mod mpris;
mod paths;
mod reconnect;
mod session;

#[cfg(test)]
mod tests;

pub use general::{GeneralConfig, LogFormat, LogLevel};
pub use mpris::MprisConfig;
pub use paths::ConfigPaths;
pub use reconnect::ReconnectConfig;
pub use session::SessionConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Main configuration structure for the bridge.
///
/// All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Remote session connection.
    #[serde(default)]
    pub session: SessionConfig,

    /// D-Bus presentation.
    #[serde(default)]
    pub mpris: MprisConfig,

    /// Reconnection and shutdown timing.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl BridgeConfig {
    /// JSON schema of the configuration file, pretty-printed
    ///
    /// # Errors
    /// Returns error if the schema cannot be serialized
    pub fn json_schema() -> serde_json::Result<String> {
        serde_json::to_string_pretty(&schemars::schema_for!(BridgeConfig))
    }
}

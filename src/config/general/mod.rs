mod log_level;

pub use log_level::{LogFormat, LogLevel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Process-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Console log format.
    #[serde(default)]
    pub log_format: LogFormat,
}

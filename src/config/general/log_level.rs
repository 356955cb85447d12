use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logging level for the bridge.
///
/// `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only failures that stop the bridge or lose D-Bus replies.
    Error,

    /// Dropped links, transient D-Bus faults and rejected events.
    Warn,

    /// Lifecycle messages: subscribed, exported, stopped (default level).
    #[default]
    Info,

    /// Every applied event, emitted property batch and state transition.
    Debug,

    /// Everything, including span entry and exit.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

/// Output format of console logs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable multi-line output
    #[default]
    Pretty,

    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Environment variable that overrides the configured format
    pub const ENV_VAR: &'static str = "SENDSPIN_MPRIS_LOG_FORMAT";

    /// Format selected by `SENDSPIN_MPRIS_LOG_FORMAT`, if set to a known value
    pub fn from_env() -> Option<Self> {
        match std::env::var(Self::ENV_VAR).ok()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

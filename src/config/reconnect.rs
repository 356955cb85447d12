use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reconnection and shutdown timing.
///
/// Delay before attempt `n` is `initial_delay_ms * multiplier^n`, capped at
/// `max_delay_ms`, and starts over after every successful subscription.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ReconnectConfig {
    /// First reconnect delay, in milliseconds.
    pub initial_delay_ms: u64,

    /// Growth factor applied after each failed attempt.
    pub multiplier: f64,

    /// Upper bound on the reconnect delay, in milliseconds.
    pub max_delay_ms: u64,

    /// Give up at startup after this many failed attempts. Unset retries forever.
    pub initial_attempts: Option<u32>,

    /// Time allowed for releasing the subscription on shutdown, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 500,
            multiplier: 2.0,
            max_delay_ms: 30_000,
            initial_attempts: None,
            shutdown_grace_ms: 2_000,
        }
    }
}

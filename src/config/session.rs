use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Connection to the remote sendspin session.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// `host:port` of the session endpoint.
    pub endpoint: String,

    /// Client name announced in the hello line.
    pub client_name: String,

    /// Optional access token announced in the hello line.
    pub token: Option<String>,

    /// Bound on one connection attempt, in milliseconds.
    pub connect_timeout_ms: u64,

    /// Silence longer than this drops the link. Unset disables the check.
    pub liveness_timeout_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from("127.0.0.1:8927"),
            client_name: String::from("sendspin-mpris"),
            token: None,
            connect_timeout_ms: 5_000,
            liveness_timeout_ms: None,
        }
    }
}

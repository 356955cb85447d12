use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const BUS_NAME_PREFIX: &str = "org.mpris.MediaPlayer2";

/// How the bridge presents itself on D-Bus.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MprisConfig {
    /// Player name shown to controllers; also the bus name suffix.
    pub name: String,

    /// Desktop entry name without the `.desktop` extension.
    pub desktop_entry: Option<String>,
}

impl Default for MprisConfig {
    fn default() -> Self {
        Self {
            name: String::from("Sendspin"),
            desktop_entry: None,
        }
    }
}

impl MprisConfig {
    /// Value of the MPRIS `Identity` property
    pub fn identity(&self) -> &str {
        &self.name
    }

    /// Well-known bus name, `org.mpris.MediaPlayer2.<name>`.
    ///
    /// Characters not allowed in a bus name element become `_`, and a
    /// leading digit gets a `_` prefix.
    pub fn bus_name(&self) -> String {
        let mut suffix: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if suffix.starts_with(|c: char| c.is_ascii_digit()) {
            suffix.insert(0, '_');
        }

        format!("{BUS_NAME_PREFIX}.{suffix}")
    }
}

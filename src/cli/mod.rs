//! Command-line interface of the `sendspin-mpris` binary.
//!
//! Flags override the matching configuration file values.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{BridgeConfig, LogLevel};


/// Expose a remote sendspin playback session as an MPRIS media player
#[derive(Debug, Clone, Parser, Default)]
#[command(name = "sendspin-mpris", version, about)]
pub struct Args {
    /// Configuration file (default: $XDG_CONFIG_HOME/sendspin-mpris/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Remote session endpoint as host:port
    #[arg(short, long, value_name = "HOST:PORT")]
    pub endpoint: Option<String>,

    /// Player name shown to MPRIS controllers
    #[arg(short, long)]
    pub name: Option<String>,

    /// Log level (RUST_LOG still takes precedence)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Also write logs to a daily rolling file
    #[arg(long)]
    pub log_file: bool,

    /// Print the configuration JSON schema and exit
    #[arg(long)]
    pub print_schema: bool,
}

impl Args {
    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.session.endpoint.clone_from(endpoint);
        }

        if let Some(name) = &self.name {
            config.mpris.name.clone_from(name);
        }

        if let Some(level) = self.log_level {
            config.general.log_level = level;
        }
    }
}

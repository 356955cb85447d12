use std::{fmt, io, path::Path, result};

use thiserror::Error;

/// Error types for the sendspin MPRIS bridge.
///
/// Each variant belongs to one fault class of the bridge: the remote session
/// link, the D-Bus transport, controller misuse, or process startup.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Connect or command failure against the remote session client
    #[error("remote session fault during {operation}: {details}")]
    RemoteSession {
        /// Operation that was attempted against the remote session
        operation: String,
        /// Failure details reported by the session client
        details: String,
    },

    /// Retryable D-Bus transport fault
    #[error("transient D-Bus fault during {operation}: {details}")]
    DbusTransient {
        /// D-Bus operation that failed
        operation: String,
        /// Fault details
        details: String,
    },

    /// Non-retryable D-Bus transport fault
    #[error("D-Bus fault during {operation}: {details}")]
    DbusPermanent {
        /// D-Bus operation that failed
        operation: String,
        /// Fault details
        details: String,
    },

    /// The remote session does not currently allow this operation
    #[error("operation '{operation}' is not supported by the remote session")]
    UnsupportedOperation {
        /// Name of the rejected MPRIS operation
        operation: String,
    },

    /// Arguments of a control call were rejected before forwarding
    #[error("invalid arguments for '{operation}': {reason}")]
    InvalidArguments {
        /// Name of the MPRIS operation
        operation: String,
        /// Why the arguments were rejected
        reason: String,
    },

    /// The bridge could not start (bus name, session bus, initial link)
    #[error("startup failed: {0}")]
    Startup(String),

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A specialized `Result` type for bridge operations.
pub type Result<T> = result::Result<T, BridgeError>;

impl BridgeError {
    /// Creates a remote session fault for the given operation.
    pub fn remote(operation: impl Into<String>, details: impl fmt::Display) -> Self {
        Self::RemoteSession {
            operation: operation.into(),
            details: details.to_string(),
        }
    }

    /// Creates an unsupported-operation fault.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Creates an invalid-arguments fault.
    pub fn invalid_arguments(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Creates a configuration error for a TOML file that failed to parse.
    pub fn toml_parse(error: impl fmt::Display, path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::Config(format!("failed to parse TOML at {}: {error}", p.display())),
            None => Self::Config(format!("failed to parse TOML: {error}")),
        }
    }
}

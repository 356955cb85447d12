use zbus::{DBusError, fdo};

use crate::BridgeError;

/// Error replies sent to MPRIS controllers.
///
/// Names are stable: `org.mpris.MediaPlayer2.Sendspin.Error.<Variant>`.
#[derive(DBusError, Debug)]
#[zbus(prefix = "org.mpris.MediaPlayer2.Sendspin.Error")]
pub enum MprisReplyError {
    /// Transport level zbus error
    #[zbus(error)]
    ZBus(zbus::Error),

    /// The capability flag for the call is not set
    UnsupportedOperation(String),

    /// Arguments were rejected before forwarding
    InvalidArguments(String),

    /// The remote session could not execute the command
    RemoteSessionFault(String),

    /// Retryable D-Bus fault
    DbusTransientFault(String),

    /// Non-retryable D-Bus fault
    DbusPermanentFault(String),

    /// Any other failure
    Failed(String),
}

impl From<BridgeError> for MprisReplyError {
    fn from(error: BridgeError) -> Self {
        let message = error.to_string();
        match error {
            BridgeError::UnsupportedOperation { .. } => Self::UnsupportedOperation(message),
            BridgeError::InvalidArguments { .. } => Self::InvalidArguments(message),
            BridgeError::RemoteSession { .. } => Self::RemoteSessionFault(message),
            BridgeError::DbusTransient { .. } => Self::DbusTransientFault(message),
            BridgeError::DbusPermanent { .. } => Self::DbusPermanentFault(message),
            BridgeError::Startup(_) | BridgeError::Config(_) | BridgeError::Io(_) => {
                Self::Failed(message)
            }
        }
    }
}

/// Property setters reply with standard `org.freedesktop.DBus.Error` names.
impl From<MprisReplyError> for fdo::Error {
    fn from(error: MprisReplyError) -> Self {
        match error {
            MprisReplyError::ZBus(error) => Self::ZBus(error),
            MprisReplyError::UnsupportedOperation(message) => Self::NotSupported(message),
            MprisReplyError::InvalidArguments(message) => Self::InvalidArgs(message),
            MprisReplyError::RemoteSessionFault(message)
            | MprisReplyError::DbusTransientFault(message)
            | MprisReplyError::DbusPermanentFault(message)
            | MprisReplyError::Failed(message) => Self::Failed(message),
        }
    }
}

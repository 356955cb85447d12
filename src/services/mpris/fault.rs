use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use zbus::DBusError;

use super::MprisReplyError;
use crate::BridgeError;

/// D-Bus error names that are expected to heal on their own
const TRANSIENT_ERROR_NAMES: [&str; 7] = [
    "org.freedesktop.DBus.Error.NameHasNoOwner",
    "org.freedesktop.DBus.Error.ServiceUnknown",
    "org.freedesktop.DBus.Error.NoReply",
    "org.freedesktop.DBus.Error.Timeout",
    "org.freedesktop.DBus.Error.TimedOut",
    "org.freedesktop.DBus.Error.Disconnected",
    "org.freedesktop.DBus.Error.LimitsExceeded",
];

/// Retry class of a D-Bus fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Retryable; the next successful call carries current truth
    Transient,

    /// Non-retryable; retrying the same call fails the same way
    Permanent,
}

/// A single observed D-Bus fault
#[derive(Debug, Clone, PartialEq)]
pub struct FaultRecord {
    /// Operation that failed
    pub operation: &'static str,
    /// Retry class
    pub kind: FaultKind,
    /// Rendered error
    pub message: String,
    /// When the fault was observed
    pub timestamp: DateTime<Utc>,
}

impl FaultRecord {
    /// Record a zbus error for `operation`
    pub fn new(operation: &'static str, error: &zbus::Error) -> Self {
        Self {
            operation,
            kind: classify(error),
            message: error.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Classify a zbus error as transient or permanent
pub fn classify(error: &zbus::Error) -> FaultKind {
    match error {
        zbus::Error::InputOutput(_) => FaultKind::Transient,
        zbus::Error::FDO(fdo) => classify_error_name(fdo.name().as_str()),
        zbus::Error::MethodError(name, _, _) => classify_error_name(name.as_str()),
        _ => FaultKind::Permanent,
    }
}

fn classify_error_name(name: &str) -> FaultKind {
    if TRANSIENT_ERROR_NAMES.contains(&name) {
        FaultKind::Transient
    } else {
        FaultKind::Permanent
    }
}

/// Convert a zbus error into the bridge taxonomy
pub fn dbus_fault(operation: &str, error: &zbus::Error) -> BridgeError {
    let details = error.to_string();
    match classify(error) {
        FaultKind::Transient => BridgeError::DbusTransient {
            operation: operation.to_string(),
            details,
        },
        FaultKind::Permanent => BridgeError::DbusPermanent {
            operation: operation.to_string(),
            details,
        },
    }
}

#[derive(Debug, Default)]
struct GuardState {
    last_fault: Mutex<Option<FaultRecord>>,
    consecutive_outbound_faults: AtomicU32,
}

/// Choke point for every call that crosses into the D-Bus transport.
///
/// Outbound emissions never fail their caller; inbound method calls always
/// end in either a value or an [`MprisReplyError`].
#[derive(Debug, Clone, Default)]
pub struct DbusFaultGuard {
    state: Arc<GuardState>,
}

impl DbusFaultGuard {
    /// Create a guard with no recorded faults
    pub fn new() -> Self {
        Self::default()
    }

    /// Run an outbound emission, logging and swallowing any fault.
    ///
    /// Returns the fault record when the emission failed.
    pub async fn outbound<F>(&self, operation: &'static str, call: F) -> Option<FaultRecord>
    where
        F: Future<Output = zbus::Result<()>>,
    {
        match call.await {
            Ok(()) => {
                let failures = self
                    .state
                    .consecutive_outbound_faults
                    .swap(0, Ordering::Relaxed);
                if failures > 0 {
                    info!(operation, failures, "D-Bus emission recovered");
                }
                None
            }
            Err(err) => {
                let record = FaultRecord::new(operation, &err);
                let failures = self
                    .state
                    .consecutive_outbound_faults
                    .fetch_add(1, Ordering::Relaxed)
                    + 1;

                match record.kind {
                    FaultKind::Transient => {
                        warn!(operation, failures, error = %err, "transient D-Bus fault on emission")
                    }
                    FaultKind::Permanent => {
                        error!(operation, failures, error = %err, "D-Bus emission rejected")
                    }
                }

                self.remember(record.clone());
                Some(record)
            }
        }
    }

    /// Run an inbound method handler and turn failures into an error reply.
    ///
    /// # Errors
    /// Returns the reply error matching the handler's [`BridgeError`].
    pub async fn inbound<T, F>(&self, operation: &'static str, call: F) -> Result<T, MprisReplyError>
    where
        F: Future<Output = crate::Result<T>>,
    {
        call.await.map_err(|err| {
            match &err {
                BridgeError::UnsupportedOperation { .. } | BridgeError::InvalidArguments { .. } => {
                    debug!(operation, error = %err, "rejected controller call")
                }
                BridgeError::RemoteSession { .. } | BridgeError::DbusTransient { .. } => {
                    warn!(operation, error = %err, "controller call failed")
                }
                _ => error!(operation, error = %err, "controller call failed"),
            }
            MprisReplyError::from(err)
        })
    }

    /// Most recent outbound fault
    pub fn last_fault(&self) -> Option<FaultRecord> {
        self.state
            .last_fault
            .lock()
            .ok()
            .and_then(|fault| fault.clone())
    }

    /// Number of outbound faults since the last successful emission
    pub fn consecutive_faults(&self) -> u32 {
        self.state.consecutive_outbound_faults.load(Ordering::Relaxed)
    }

    fn remember(&self, record: FaultRecord) {
        if let Ok(mut last) = self.state.last_fault.lock() {
            *last = Some(record);
        }
    }
}

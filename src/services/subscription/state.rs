use std::fmt;

/// Lifecycle state of the link to the remote session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No link; the exposed player is stopped with no capabilities
    #[default]
    Disconnected,

    /// A connection attempt is in flight
    Connecting {
        /// 1-based attempt number since the last successful subscription
        attempt: u32,
    },

    /// Remote events are flowing into the projector
    Subscribed,

    /// Shutdown requested; the handle is being released
    ShuttingDown,
}

impl LinkState {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: &LinkState) -> bool {
        use LinkState::{Connecting, Disconnected, ShuttingDown, Subscribed};

        matches!(
            (self, next),
            (Disconnected, Connecting { .. })
                | (Connecting { .. }, Subscribed | Disconnected)
                | (Subscribed, Disconnected)
                | (Disconnected | Connecting { .. } | Subscribed, ShuttingDown)
                | (ShuttingDown, Disconnected)
        )
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting { attempt } => write!(f, "connecting (attempt {attempt})"),
            Self::Subscribed => f.write_str("subscribed"),
            Self::ShuttingDown => f.write_str("shutting down"),
        }
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, warn};

use super::{RemoteMessage, SessionEvent};
use crate::services::mpris::{MprisProperty, MprisStateProjector};

/// What happened to one remote message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Merged into the playback state; lists the properties that changed
    Applied(Vec<MprisProperty>),

    /// Rejected without touching state
    Dropped,

    /// The remote closed the session
    SessionEnded,
}

/// Turns remote session messages into projector deltas.
///
/// Messages are handled one at a time in receipt order. Each accepted event
/// produces exactly one `apply`; rejected ones are logged and counted.
pub struct SessionEventAdapter {
    projector: Arc<MprisStateProjector>,
    accepted: AtomicU64,
    dropped: AtomicU64,
}

impl SessionEventAdapter {
    /// Adapter feeding `projector`
    pub fn new(projector: Arc<MprisStateProjector>) -> Self {
        Self {
            projector,
            accepted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Decode `raw` and merge it into the playback state
    pub async fn handle(&self, raw: RemoteMessage) -> Disposition {
        let event = match SessionEvent::decode(&raw) {
            Ok(event) => event,
            Err(err) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(error = %err, dropped = total, "dropping session event");
                return Disposition::Dropped;
            }
        };

        self.accepted.fetch_add(1, Ordering::Relaxed);
        let kind = event.kind();

        if let SessionEvent::SessionEnded { reason } = &event {
            info!(reason = reason.as_deref().unwrap_or("none"), "remote session ended");
            return Disposition::SessionEnded;
        }

        let Some(delta) = event.into_delta() else {
            return Disposition::Dropped;
        };

        let changed = self.projector.apply(delta).await;
        debug!(event = kind, changed = changed.len(), "applied session event");
        Disposition::Applied(changed)
    }

    /// Number of events accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Number of messages dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

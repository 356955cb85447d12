use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use super::{DbusFaultGuard, MergeOutcome, MprisProperty, PlaybackState, PropertySink, StateDelta};
use crate::services::common::Property;

/// Owner of the single authoritative [`PlaybackState`].
///
/// Deltas are merged and announced one at a time, so change signals leave in
/// the order the deltas were applied. Readers never wait on a writer.
pub struct MprisStateProjector {
    state: Property<PlaybackState>,
    sink: Arc<dyn PropertySink>,
    guard: DbusFaultGuard,
    emission: Mutex<()>,
}

impl MprisStateProjector {
    /// Create a projector starting from the stopped, capability-less state
    pub fn new(sink: Arc<dyn PropertySink>, guard: DbusFaultGuard) -> Self {
        Self {
            state: Property::new(PlaybackState::default()),
            sink,
            guard,
            emission: Mutex::new(()),
        }
    }

    /// Merge `delta` and announce every MPRIS property it changed.
    ///
    /// Emission faults are handled by the fault guard; the merged state stays
    /// committed either way. Returns the properties that changed.
    #[instrument(skip(self), level = "debug")]
    pub async fn apply(&self, delta: StateDelta) -> Vec<MprisProperty> {
        let _emission = self.emission.lock().await;

        let now = Instant::now();
        let outcome: MergeOutcome = self.state.update(|state| {
            let outcome = state.merge(delta, now);
            (true, outcome)
        });

        if !outcome.changed.is_empty() {
            let snapshot = self.state.get();
            debug!(changed = ?outcome.changed, status = %snapshot.status, "announcing property changes");
            self.guard
                .outbound(
                    "PropertiesChanged",
                    self.sink.properties_changed(&snapshot, &outcome.changed),
                )
                .await;
        }

        if let Some(position) = outcome.seeked {
            debug!(?position, "announcing seek");
            self.guard
                .outbound("Seeked", self.sink.seeked(position))
                .await;
        }

        outcome.changed
    }

    /// Project a lost remote link: stopped, no capabilities.
    ///
    /// Applying it to an already disconnected state announces nothing.
    pub async fn disconnected_state(&self) -> Vec<MprisProperty> {
        self.apply(StateDelta::disconnected()).await
    }

    /// Latest committed state
    pub fn snapshot(&self) -> PlaybackState {
        self.state.get()
    }

    /// Current extrapolated playback position
    pub fn position(&self) -> Duration {
        self.state.get().position_at(Instant::now())
    }

    /// Stream of committed states, starting with the current one
    pub fn watch(&self) -> impl Stream<Item = PlaybackState> + Send + use<> {
        self.state.watch()
    }

    /// Fault guard wrapping this projector's emissions
    pub fn guard(&self) -> &DbusFaultGuard {
        &self.guard
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use zbus::{
    interface,
    object_server::SignalEmitter,
    zvariant::{ObjectPath, OwnedValue},
};

use super::{
    Capabilities, CommandRelay, DbusFaultGuard, MprisReplyError, MprisStateProjector, metadata,
};
use crate::BridgeError;

/// `org.mpris.MediaPlayer2` root object
pub struct MediaPlayer2Root {
    identity: String,
    desktop_entry: Option<String>,
    shutdown: CancellationToken,
}

impl MediaPlayer2Root {
    /// Root object whose `Quit` cancels `shutdown`
    pub fn new(identity: String, desktop_entry: Option<String>, shutdown: CancellationToken) -> Self {
        Self {
            identity,
            desktop_entry,
            shutdown,
        }
    }
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl MediaPlayer2Root {
    fn raise(&self) {}

    fn quit(&self) {
        info!("quit requested over MPRIS");
        self.shutdown.cancel();
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn identity(&self) -> String {
        self.identity.clone()
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn desktop_entry(&self) -> String {
        self.desktop_entry.clone().unwrap_or_default()
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn supported_uri_schemes(&self) -> Vec<String> {
        Vec::new()
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn supported_mime_types(&self) -> Vec<String> {
        Vec::new()
    }
}

/// `org.mpris.MediaPlayer2.Player` object backed by the projector and relay
pub struct MediaPlayer2Player {
    projector: Arc<MprisStateProjector>,
    relay: Arc<CommandRelay>,
    guard: DbusFaultGuard,
}

impl MediaPlayer2Player {
    /// Player object reading from `projector` and forwarding through `relay`
    pub fn new(
        projector: Arc<MprisStateProjector>,
        relay: Arc<CommandRelay>,
        guard: DbusFaultGuard,
    ) -> Self {
        Self {
            projector,
            relay,
            guard,
        }
    }

    fn has(&self, flag: Capabilities) -> bool {
        self.projector.snapshot().capabilities.contains(flag)
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl MediaPlayer2Player {
    async fn play(&self) -> Result<(), MprisReplyError> {
        self.guard.inbound("Play", self.relay.play()).await
    }

    async fn pause(&self) -> Result<(), MprisReplyError> {
        self.guard.inbound("Pause", self.relay.pause()).await
    }

    async fn play_pause(&self) -> Result<(), MprisReplyError> {
        self.guard.inbound("PlayPause", self.relay.play_pause()).await
    }

    async fn stop(&self) -> Result<(), MprisReplyError> {
        self.guard.inbound("Stop", self.relay.stop()).await
    }

    async fn next(&self) -> Result<(), MprisReplyError> {
        self.guard.inbound("Next", self.relay.next()).await
    }

    async fn previous(&self) -> Result<(), MprisReplyError> {
        self.guard.inbound("Previous", self.relay.previous()).await
    }

    async fn seek(&self, offset: i64) -> Result<(), MprisReplyError> {
        self.guard.inbound("Seek", self.relay.seek(offset)).await
    }

    async fn set_position(
        &self,
        track_id: ObjectPath<'_>,
        position: i64,
    ) -> Result<(), MprisReplyError> {
        self.guard
            .inbound(
                "SetPosition",
                self.relay.set_position(track_id.as_str(), position),
            )
            .await
    }

    async fn open_uri(&self, uri: String) -> Result<(), MprisReplyError> {
        self.guard
            .inbound("OpenUri", async move {
                Err::<(), _>(BridgeError::unsupported(format!("OpenUri({uri})")))
            })
            .await
    }

    #[zbus(signal)]
    async fn seeked(emitter: &SignalEmitter<'_>, position: i64) -> zbus::Result<()>;

    #[zbus(property)]
    fn playback_status(&self) -> String {
        self.projector.snapshot().status.as_mpris().to_string()
    }

    #[zbus(property)]
    fn metadata(&self) -> zbus::fdo::Result<HashMap<String, OwnedValue>> {
        metadata::metadata_map(&self.projector.snapshot().track)
            .map_err(|err| zbus::fdo::Error::Failed(err.to_string()))
    }

    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        metadata::position_micros(&self.projector.snapshot(), Instant::now())
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        self.projector.snapshot().effective_volume()
    }

    #[zbus(property)]
    async fn set_volume(&self, volume: f64) -> zbus::fdo::Result<()> {
        self.guard
            .inbound("SetVolume", self.relay.set_volume(volume))
            .await
            .map_err(zbus::fdo::Error::from)
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn rate(&self) -> f64 {
        1.0
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn minimum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property(emits_changed_signal = "const"))]
    fn maximum_rate(&self) -> f64 {
        1.0
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.has(Capabilities::PLAY)
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.has(Capabilities::PAUSE)
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        self.has(Capabilities::SEEK)
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.has(Capabilities::GO_NEXT)
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.has(Capabilities::GO_PREVIOUS)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        self.projector.snapshot().can_control()
    }
}

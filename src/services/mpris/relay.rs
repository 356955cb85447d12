use std::sync::Arc;

use tracing::{debug, instrument};

use super::{Capabilities, MprisStateProjector, PlaybackStatus, Volume, utils};
use crate::services::session::{Command, SessionClient};
use crate::{BridgeError, Result};

/// Capability a control call needs before it may be forwarded
#[derive(Debug, Clone, Copy)]
enum Requirement {
    Flag(Capabilities),
    Control,
}

/// Forwards MPRIS control calls to the remote session.
///
/// Every call is checked against the current capability flags first; a
/// missing flag fails with `UnsupportedOperation` and nothing is sent.
pub struct CommandRelay {
    client: Arc<dyn SessionClient>,
    projector: Arc<MprisStateProjector>,
}

impl CommandRelay {
    /// Create a relay reading capabilities from `projector`
    pub fn new(client: Arc<dyn SessionClient>, projector: Arc<MprisStateProjector>) -> Self {
        Self { client, projector }
    }

    /// Start playback
    ///
    /// # Errors
    /// Returns error if `CanPlay` is unset or the remote rejects the command
    pub async fn play(&self) -> Result<()> {
        self.forward("Play", Requirement::Flag(Capabilities::PLAY), Command::Play)
            .await
    }

    /// Pause playback
    ///
    /// # Errors
    /// Returns error if `CanPause` is unset or the remote rejects the command
    pub async fn pause(&self) -> Result<()> {
        self.forward("Pause", Requirement::Flag(Capabilities::PAUSE), Command::Pause)
            .await
    }

    /// Pause when playing, play otherwise
    ///
    /// # Errors
    /// Returns error if the needed flag is unset or the remote rejects the command
    pub async fn play_pause(&self) -> Result<()> {
        match self.projector.snapshot().status {
            PlaybackStatus::Playing => {
                self.forward(
                    "PlayPause",
                    Requirement::Flag(Capabilities::PAUSE),
                    Command::Pause,
                )
                .await
            }
            PlaybackStatus::Paused | PlaybackStatus::Stopped => {
                self.forward(
                    "PlayPause",
                    Requirement::Flag(Capabilities::PLAY),
                    Command::Play,
                )
                .await
            }
        }
    }

    /// Stop playback
    ///
    /// # Errors
    /// Returns error if `CanControl` is false or the remote rejects the command
    pub async fn stop(&self) -> Result<()> {
        self.forward("Stop", Requirement::Control, Command::Stop).await
    }

    /// Skip to the next track
    ///
    /// # Errors
    /// Returns error if `CanGoNext` is unset or the remote rejects the command
    pub async fn next(&self) -> Result<()> {
        self.forward("Next", Requirement::Flag(Capabilities::GO_NEXT), Command::Next)
            .await
    }

    /// Go back to the previous track
    ///
    /// # Errors
    /// Returns error if `CanGoPrevious` is unset or the remote rejects the command
    pub async fn previous(&self) -> Result<()> {
        self.forward(
            "Previous",
            Requirement::Flag(Capabilities::GO_PREVIOUS),
            Command::Previous,
        )
        .await
    }

    /// Seek by a relative offset in microseconds
    ///
    /// # Errors
    /// Returns error if `CanSeek` is unset or the remote rejects the command
    pub async fn seek(&self, offset_micros: i64) -> Result<()> {
        self.forward(
            "Seek",
            Requirement::Flag(Capabilities::SEEK),
            Command::Seek { offset_micros },
        )
        .await
    }

    /// Jump to an absolute position in the current track
    ///
    /// `track_path` is the `mpris:trackid` object path the controller read.
    ///
    /// # Errors
    /// Returns error if `CanSeek` is unset, the track id is stale, the position
    /// lies outside the track, or the remote rejects the command
    pub async fn set_position(&self, track_path: &str, position_micros: i64) -> Result<()> {
        const OPERATION: &str = "SetPosition";

        let state = self.projector.snapshot();
        check(OPERATION, Requirement::Flag(Capabilities::SEEK), &state.capabilities)?;

        let current = utils::track_object_path(state.track.track_id.as_deref());
        if track_path != current {
            return Err(BridgeError::invalid_arguments(
                OPERATION,
                format!("track {track_path} is not the current track"),
            ));
        }

        let Some(position) = utils::from_mpris_micros(position_micros) else {
            return Err(BridgeError::invalid_arguments(
                OPERATION,
                "position must not be negative",
            ));
        };

        if let Some(length) = state.track.length {
            if position > length {
                return Err(BridgeError::invalid_arguments(
                    OPERATION,
                    format!("position {position:?} is past the track length {length:?}"),
                ));
            }
        }

        self.send(
            OPERATION,
            Command::SetPosition {
                track_id: state.track.track_id.unwrap_or_default(),
                position_micros,
            },
        )
        .await
    }

    /// Change the remote volume (0.0 - 1.0)
    ///
    /// # Errors
    /// Returns error if `CanControl` is false or the remote rejects the command
    pub async fn set_volume(&self, volume: f64) -> Result<()> {
        let percent = Volume::new(volume).as_percent();
        self.forward(
            "SetVolume",
            Requirement::Control,
            Command::SetVolume { percent },
        )
        .await
    }

    async fn forward(
        &self,
        operation: &'static str,
        requirement: Requirement,
        command: Command,
    ) -> Result<()> {
        check(
            operation,
            requirement,
            &self.projector.snapshot().capabilities,
        )?;
        self.send(operation, command).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn send(&self, operation: &'static str, command: Command) -> Result<()> {
        debug!("forwarding command to remote session");
        self.client
            .send_command(command)
            .await
            .map_err(|err| match err {
                BridgeError::RemoteSession { .. } => err,
                other => BridgeError::remote(operation, other),
            })
    }
}

fn check(operation: &'static str, requirement: Requirement, capabilities: &Capabilities) -> Result<()> {
    let allowed = match requirement {
        Requirement::Flag(flag) => capabilities.contains(flag),
        Requirement::Control => !capabilities.is_empty(),
    };

    if allowed {
        Ok(())
    } else {
        Err(BridgeError::unsupported(operation))
    }
}

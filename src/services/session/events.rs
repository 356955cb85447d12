use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::services::mpris::{Capabilities, PlaybackStatus, StateDelta, TrackPatch, Volume};

/// Keeps "field absent" (`None`) apart from "field is null" (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Playback state as reported by the remote session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemotePlaybackStatus {
    /// Playing
    Playing,
    /// Paused
    Paused,
    /// Stopped
    Stopped,
}

impl From<RemotePlaybackStatus> for PlaybackStatus {
    fn from(status: RemotePlaybackStatus) -> Self {
        match status {
            RemotePlaybackStatus::Playing => Self::Playing,
            RemotePlaybackStatus::Paused => Self::Paused,
            RemotePlaybackStatus::Stopped => Self::Stopped,
        }
    }
}

/// Media command names the remote session may advertise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCommand {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Skip to next track
    Next,
    /// Go to previous track
    Previous,
    /// Seek within the track
    Seek,
    /// Change volume
    Volume,
    /// Mute or unmute
    Mute,
    /// Any command this bridge does not map
    #[serde(other)]
    Other,
}

/// Capability flags enabled by a set of advertised commands
pub fn capabilities_from(commands: &[RemoteCommand]) -> Capabilities {
    commands
        .iter()
        .fold(Capabilities::empty(), |caps, command| match command {
            RemoteCommand::Play => caps | Capabilities::PLAY,
            RemoteCommand::Pause => caps | Capabilities::PAUSE,
            RemoteCommand::Seek => caps | Capabilities::SEEK,
            RemoteCommand::Next => caps | Capabilities::GO_NEXT,
            RemoteCommand::Previous => caps | Capabilities::GO_PREVIOUS,
            RemoteCommand::Stop
            | RemoteCommand::Volume
            | RemoteCommand::Mute
            | RemoteCommand::Other => caps,
        })
}

/// Event pushed by the remote session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A different track, or new metadata for the current one.
    ///
    /// Fields left out keep their value while the track id is unchanged;
    /// `null` clears them.
    TrackChanged {
        /// Remote track identifier
        #[serde(default, deserialize_with = "present")]
        track_id: Option<Option<String>>,
        /// Track title
        #[serde(default, deserialize_with = "present")]
        title: Option<Option<String>>,
        /// Track artists
        #[serde(default, deserialize_with = "present")]
        artists: Option<Option<Vec<String>>>,
        /// Album name
        #[serde(default, deserialize_with = "present")]
        album: Option<Option<String>>,
        /// Track length in milliseconds
        #[serde(default, deserialize_with = "present")]
        duration_ms: Option<Option<u64>>,
    },

    /// Playback progress report
    PositionUpdated {
        /// Position in milliseconds
        position_ms: u64,
        /// Track length in milliseconds
        duration_ms: Option<u64>,
    },

    /// Playback status change
    StatusChanged {
        /// New status
        status: RemotePlaybackStatus,
    },

    /// Controller capabilities and group volume
    ControllerState {
        /// Commands the session currently accepts
        #[serde(default)]
        supported_commands: Vec<RemoteCommand>,
        /// Volume 0-100
        volume: Option<u8>,
        /// Whether the group is muted
        #[serde(default)]
        muted: bool,
    },

    /// The remote session closed
    SessionEnded {
        /// Reason given by the remote, if any
        reason: Option<String>,
    },
}

/// Why a raw message could not be turned into an event
#[derive(Debug, thiserror::Error)]
pub enum EventDecodeError {
    /// Unknown type or malformed payload
    #[error("malformed session event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Well-formed but out of range
    #[error("invalid session event: {0}")]
    Invalid(String),
}

impl SessionEvent {
    /// Decode and validate a raw message
    ///
    /// # Errors
    /// Returns error for unknown event types, malformed payloads and
    /// out-of-range values
    pub fn decode(raw: &serde_json::Value) -> Result<Self, EventDecodeError> {
        let event = Self::deserialize(raw)?;

        if let Self::ControllerState {
            volume: Some(volume),
            ..
        } = &event
        {
            if *volume > 100 {
                return Err(EventDecodeError::Invalid(format!(
                    "volume {volume} is outside 0-100"
                )));
            }
        }

        Ok(event)
    }

    /// Event name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TrackChanged { .. } => "track_changed",
            Self::PositionUpdated { .. } => "position_updated",
            Self::StatusChanged { .. } => "status_changed",
            Self::ControllerState { .. } => "controller_state",
            Self::SessionEnded { .. } => "session_ended",
        }
    }

    /// State patch carried by this event; `None` for `SessionEnded`
    pub fn into_delta(self) -> Option<StateDelta> {
        match self {
            Self::TrackChanged {
                track_id,
                title,
                artists,
                album,
                duration_ms,
            } => Some(StateDelta {
                track: Some(TrackPatch {
                    track_id,
                    title,
                    artists: artists.map(Option::unwrap_or_default),
                    album,
                    length: duration_ms.map(|ms| ms.map(Duration::from_millis)),
                }),
                ..StateDelta::default()
            }),
            Self::PositionUpdated {
                position_ms,
                duration_ms,
            } => Some(StateDelta {
                position: Some(Duration::from_millis(position_ms)),
                length: duration_ms.map(Duration::from_millis),
                ..StateDelta::default()
            }),
            Self::StatusChanged { status } => Some(StateDelta {
                status: Some(status.into()),
                ..StateDelta::default()
            }),
            Self::ControllerState {
                supported_commands,
                volume,
                muted,
            } => Some(StateDelta {
                capabilities: Some(capabilities_from(&supported_commands)),
                volume: volume.map(Volume::from_percent),
                muted: Some(muted),
                ..StateDelta::default()
            }),
            Self::SessionEnded { .. } => None,
        }
    }
}

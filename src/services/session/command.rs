use serde::{Deserialize, Serialize};

/// Control command sent to the remote session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
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

    /// Seek by a relative offset
    Seek {
        /// Offset in microseconds, negative seeks backwards
        offset_micros: i64,
    },

    /// Jump to an absolute position
    SetPosition {
        /// Remote id of the track the position applies to
        track_id: String,
        /// Position in microseconds
        position_micros: i64,
    },

    /// Change the group volume
    SetVolume {
        /// Volume 0-100
        percent: u8,
    },
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Seek { .. } => "seek",
            Self::SetPosition { .. } => "set_position",
            Self::SetVolume { .. } => "set_volume",
        }
    }
}

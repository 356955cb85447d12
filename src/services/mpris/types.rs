use std::fmt;
use std::ops::Deref;
use std::time::Duration;

use bitflags::bitflags;
use tokio::time::Instant;

/// Position jumps larger than this are reported as seeks.
pub const SEEK_TOLERANCE: Duration = Duration::from_secs(1);

/// Current playback status as exposed through MPRIS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Remote session is playing
    Playing,

    /// Remote session is paused
    Paused,

    /// Nothing is playing, or the session is unreachable
    #[default]
    Stopped,
}

impl PlaybackStatus {
    /// MPRIS `PlaybackStatus` string value
    pub fn as_mpris(&self) -> &'static str {
        match self {
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_mpris())
    }
}

bitflags! {
    /// Control operations the remote session currently accepts
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capabilities: u8 {
        /// `CanPlay`
        const PLAY = 1;
        /// `CanPause`
        const PAUSE = 1 << 1;
        /// `CanSeek`
        const SEEK = 1 << 2;
        /// `CanGoNext`
        const GO_NEXT = 1 << 3;
        /// `CanGoPrevious`
        const GO_PREVIOUS = 1 << 4;
    }
}

/// Volume of the remote session
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Volume(f64);

impl Volume {
    /// Create a new instance of a volume with safeguarded values
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    /// Create a volume from a 0-100 percentage
    pub fn from_percent(percent: u8) -> Self {
        Self::new(f64::from(percent) / 100.0)
    }

    /// Get the volume as a rounded 0-100 percentage
    pub fn as_percent(&self) -> u8 {
        (self.0.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

impl Deref for Volume {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<f64> for Volume {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// Metadata for the track the remote session is playing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackInfo {
    /// Remote track identifier
    pub track_id: Option<String>,

    /// Track title
    pub title: Option<String>,

    /// Track artist(s)
    pub artists: Vec<String>,

    /// Album name
    pub album: Option<String>,

    /// Track length
    pub length: Option<Duration>,
}

/// Track fields carried by one update.
///
/// The outer `Option` of each field is `None` when the update leaves the
/// field out; an inner `None` clears it. An update naming a different
/// `track_id` replaces the track, and left-out fields are then empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackPatch {
    /// Remote track identifier
    pub track_id: Option<Option<String>>,
    /// Track title
    pub title: Option<Option<String>>,
    /// Track artist(s)
    pub artists: Option<Vec<String>>,
    /// Album name
    pub album: Option<Option<String>>,
    /// Track length
    pub length: Option<Option<Duration>>,
}

impl TrackPatch {
    /// Whether applying this patch to `current` starts a different track
    pub fn replaces(&self, current: &TrackInfo) -> bool {
        self.track_id
            .as_ref()
            .is_some_and(|id| *id != current.track_id)
    }

    /// Apply onto `track`, returning whether the track was replaced
    pub fn apply_to(self, track: &mut TrackInfo) -> bool {
        let replaced = self.replaces(track);
        if replaced {
            *track = TrackInfo::default();
        }

        if let Some(track_id) = self.track_id {
            track.track_id = track_id;
        }
        if let Some(title) = self.title {
            track.title = title;
        }
        if let Some(artists) = self.artists {
            track.artists = artists;
        }
        if let Some(album) = self.album {
            track.album = album;
        }
        if let Some(length) = self.length {
            track.length = length;
        }

        replaced
    }
}

impl From<TrackInfo> for TrackPatch {
    fn from(track: TrackInfo) -> Self {
        Self {
            track_id: Some(track.track_id),
            title: Some(track.title),
            artists: Some(track.artists),
            album: Some(track.album),
            length: Some(track.length),
        }
    }
}

/// Properties of `org.mpris.MediaPlayer2.Player` that announce changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MprisProperty {
    /// `PlaybackStatus`
    PlaybackStatus,
    /// `Metadata`
    Metadata,
    /// `Volume`
    Volume,
    /// `CanPlay`
    CanPlay,
    /// `CanPause`
    CanPause,
    /// `CanSeek`
    CanSeek,
    /// `CanGoNext`
    CanGoNext,
    /// `CanGoPrevious`
    CanGoPrevious,
    /// `CanControl`
    CanControl,
}

impl MprisProperty {
    /// D-Bus property name
    pub fn name(&self) -> &'static str {
        match self {
            Self::PlaybackStatus => "PlaybackStatus",
            Self::Metadata => "Metadata",
            Self::Volume => "Volume",
            Self::CanPlay => "CanPlay",
            Self::CanPause => "CanPause",
            Self::CanSeek => "CanSeek",
            Self::CanGoNext => "CanGoNext",
            Self::CanGoPrevious => "CanGoPrevious",
            Self::CanControl => "CanControl",
        }
    }
}

const CAPABILITY_PROPERTIES: [(Capabilities, MprisProperty); 5] = [
    (Capabilities::PLAY, MprisProperty::CanPlay),
    (Capabilities::PAUSE, MprisProperty::CanPause),
    (Capabilities::SEEK, MprisProperty::CanSeek),
    (Capabilities::GO_NEXT, MprisProperty::CanGoNext),
    (Capabilities::GO_PREVIOUS, MprisProperty::CanGoPrevious),
];

/// Field patch produced from one remote event.
///
/// Absent fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDelta {
    /// New playback status
    pub status: Option<PlaybackStatus>,
    /// Track metadata update
    pub track: Option<TrackPatch>,
    /// New length of the current track
    pub length: Option<Duration>,
    /// New playback position
    pub position: Option<Duration>,
    /// New capability set
    pub capabilities: Option<Capabilities>,
    /// New volume
    pub volume: Option<Volume>,
    /// New mute flag
    pub muted: Option<bool>,
}

impl StateDelta {
    /// Delta projected when the remote link is lost.
    pub fn disconnected() -> Self {
        Self {
            status: Some(PlaybackStatus::Stopped),
            capabilities: Some(Capabilities::empty()),
            ..Self::default()
        }
    }

    /// Whether the delta carries no field at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What a merge changed, as seen by MPRIS clients
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Properties whose projected value changed, in emission order
    pub changed: Vec<MprisProperty>,
    /// Set when the position jumped and `Seeked` must be emitted
    pub seeked: Option<Duration>,
}

/// Playback state of the mirrored remote session
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Current playback status
    pub status: PlaybackStatus,

    /// Current track
    pub track: TrackInfo,

    /// Position at `position_anchor`
    pub position: Duration,

    /// Instant at which `position` was last known exactly
    pub position_anchor: Instant,

    /// Allowed control operations
    pub capabilities: Capabilities,

    /// Remote volume
    pub volume: Volume,

    /// Remote mute flag
    pub muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl PlaybackState {
    /// Stopped state with no track and no capabilities
    pub fn new(now: Instant) -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            track: TrackInfo::default(),
            position: Duration::ZERO,
            position_anchor: now,
            capabilities: Capabilities::empty(),
            volume: Volume::new(1.0),
            muted: false,
        }
    }

    /// Position extrapolated to `now`, capped at the track length
    pub fn position_at(&self, now: Instant) -> Duration {
        let position = match self.status {
            PlaybackStatus::Playing => {
                self.position + now.saturating_duration_since(self.position_anchor)
            }
            PlaybackStatus::Paused | PlaybackStatus::Stopped => self.position,
        };

        match self.track.length {
            Some(length) => position.min(length),
            None => position,
        }
    }

    /// Whether any control is currently possible
    pub fn can_control(&self) -> bool {
        !self.capabilities.is_empty()
    }

    /// Volume as shown to MPRIS clients
    pub fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { *self.volume }
    }

    /// Merge a delta at `now` and report what MPRIS clients must be told.
    pub fn merge(&mut self, delta: StateDelta, now: Instant) -> MergeOutcome {
        let previous = self.clone();
        let extrapolated = self.position_at(now);

        self.position = extrapolated;
        self.position_anchor = now;

        if let Some(status) = delta.status {
            self.status = status;
        }

        let track_replaced = delta
            .track
            .is_some_and(|patch| patch.apply_to(&mut self.track));

        if let Some(length) = delta.length {
            self.track.length = Some(length);
        }

        let mut seeked = None;
        match delta.position {
            Some(position) => {
                let jump = position.abs_diff(extrapolated);
                if !track_replaced && jump > SEEK_TOLERANCE {
                    seeked = Some(position);
                }
                self.position = position;
            }
            None if track_replaced => self.position = Duration::ZERO,
            None => {}
        }

        if let Some(capabilities) = delta.capabilities {
            self.capabilities = capabilities;
        }

        if let Some(volume) = delta.volume {
            self.volume = volume;
        }

        if let Some(muted) = delta.muted {
            self.muted = muted;
        }

        MergeOutcome {
            changed: changed_properties(&previous, self),
            seeked,
        }
    }
}

/// MPRIS properties whose projected value differs between two states
pub fn changed_properties(old: &PlaybackState, new: &PlaybackState) -> Vec<MprisProperty> {
    let mut changed = Vec::new();

    if old.status != new.status {
        changed.push(MprisProperty::PlaybackStatus);
    }

    if old.track != new.track {
        changed.push(MprisProperty::Metadata);
    }

    if old.effective_volume() != new.effective_volume() {
        changed.push(MprisProperty::Volume);
    }

    for (flag, property) in CAPABILITY_PROPERTIES {
        if old.capabilities.contains(flag) != new.capabilities.contains(flag) {
            changed.push(property);
        }
    }

    if old.can_control() != new.can_control() {
        changed.push(MprisProperty::CanControl);
    }

    changed
}

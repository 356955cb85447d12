use std::collections::HashMap;

use tokio::time::Instant;
use zbus::zvariant::{self, ObjectPath, OwnedValue, Value};

use super::{Capabilities, MprisProperty, PlaybackState, TrackInfo, utils};

fn owned<'a>(value: impl Into<Value<'a>>) -> zvariant::Result<OwnedValue> {
    OwnedValue::try_from(value.into())
}

/// Build the MPRIS `Metadata` dictionary for a track
///
/// # Errors
/// Returns error if a value cannot be represented as a D-Bus variant
pub fn metadata_map(track: &TrackInfo) -> zvariant::Result<HashMap<String, OwnedValue>> {
    let mut map = HashMap::new();

    let track_path = ObjectPath::try_from(utils::track_object_path(track.track_id.as_deref()))?;
    map.insert("mpris:trackid".to_string(), owned(track_path)?);

    if let Some(length) = track.length {
        map.insert(
            "mpris:length".to_string(),
            owned(utils::to_mpris_micros(length))?,
        );
    }

    if let Some(title) = &track.title {
        map.insert("xesam:title".to_string(), owned(title.as_str())?);
    }

    if !track.artists.is_empty() {
        map.insert("xesam:artist".to_string(), owned(track.artists.clone())?);
    }

    if let Some(album) = &track.album {
        map.insert("xesam:album".to_string(), owned(album.as_str())?);
    }

    Ok(map)
}

/// Current D-Bus value of a change-announcing property
///
/// # Errors
/// Returns error if the value cannot be represented as a D-Bus variant
pub fn property_value(
    state: &PlaybackState,
    property: MprisProperty,
) -> zvariant::Result<OwnedValue> {
    match property {
        MprisProperty::PlaybackStatus => owned(state.status.as_mpris()),
        MprisProperty::Metadata => owned(metadata_map(&state.track)?),
        MprisProperty::Volume => owned(state.effective_volume()),
        MprisProperty::CanPlay => owned(state.capabilities.contains(Capabilities::PLAY)),
        MprisProperty::CanPause => owned(state.capabilities.contains(Capabilities::PAUSE)),
        MprisProperty::CanSeek => owned(state.capabilities.contains(Capabilities::SEEK)),
        MprisProperty::CanGoNext => owned(state.capabilities.contains(Capabilities::GO_NEXT)),
        MprisProperty::CanGoPrevious => {
            owned(state.capabilities.contains(Capabilities::GO_PREVIOUS))
        }
        MprisProperty::CanControl => owned(state.can_control()),
    }
}

/// MPRIS `Position` in microseconds at `now`
pub fn position_micros(state: &PlaybackState, now: Instant) -> i64 {
    utils::to_mpris_micros(state.position_at(now))
}

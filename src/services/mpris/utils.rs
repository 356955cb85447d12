use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Duration;

/// Object path reported when no track is loaded
pub const NO_TRACK_PATH: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

const TRACK_PATH_PREFIX: &str = "/org/mpris/MediaPlayer2/Track/";

/// Convert Duration to MPRIS position in microseconds
pub fn to_mpris_micros(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}

/// Convert a non-negative MPRIS microsecond value to a Duration
pub fn from_mpris_micros(micros: i64) -> Option<Duration> {
    u64::try_from(micros).ok().map(Duration::from_micros)
}

/// D-Bus object path used as `mpris:trackid` for a remote track id
///
/// Ids that are already valid path elements map to themselves. Others are
/// escaped and suffixed with a hash of the raw id, so distinct ids never
/// share a path.
pub fn track_object_path(track_id: Option<&str>) -> String {
    match track_id {
        Some(id) if !id.is_empty() => {
            let escaped: String = id
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
                .collect();

            if escaped == id {
                format!("{TRACK_PATH_PREFIX}{escaped}")
            } else {
                format!("{TRACK_PATH_PREFIX}{escaped}_{:08x}", id_hash(id))
            }
        }
        _ => NO_TRACK_PATH.to_string(),
    }
}

fn id_hash(id: &str) -> u32 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() & u64::from(u32::MAX)) as u32
}

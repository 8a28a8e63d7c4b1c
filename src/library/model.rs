use std::path::{Path, PathBuf};

/// Stable identifier for a track, derived from its path.
pub type TrackId = u64;

#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_ms: u64,
    /// Artwork source: a sidecar image, or the audio file itself when the
    /// tag carries an embedded picture.
    pub artwork: Option<PathBuf>,
    pub display: String,
}

/// FNV-1a over the path bytes. Survives rescans and process restarts as long
/// as the file does not move.
pub fn track_id_for_path(path: &Path) -> TrackId {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in path.as_os_str().as_encoded_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

pub(super) fn make_display(title: &str, artist: Option<&str>) -> String {
    match artist {
        Some(a) if !a.trim().is_empty() => format!("{} - {}", a.trim(), title),
        _ => title.to_string(),
    }
}

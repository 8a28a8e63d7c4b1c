use crate::engine::RepeatMode;
use crate::library::TrackId;

/// One immutable snapshot of playback. Replaced wholesale on every
/// transition; only the controller actor produces new values.
///
/// Invariant: `current_track_id` is a member of `queue_ids` whenever the
/// queue is non-empty, and `None` when it is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub queue_ids: Vec<TrackId>,
    pub current_track_id: Option<TrackId>,
    pub is_playing: bool,
    pub position_ms: u64,
    /// 0 while the new track's length is not yet known, e.g. right after a
    /// transition.
    pub duration_ms: u64,
    pub repeat_mode: RepeatMode,
    pub shuffle_enabled: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            queue_ids: Vec::new(),
            current_track_id: None,
            is_playing: false,
            position_ms: 0,
            duration_ms: 0,
            repeat_mode: RepeatMode::All,
            shuffle_enabled: false,
        }
    }
}

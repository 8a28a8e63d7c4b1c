use crate::library::TrackId;

/// What the status surface shows for the current track.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusContent {
    /// Never blank; falls back to "Music".
    pub title: String,
    /// Omitted entirely when blank.
    pub artist: Option<String>,
    pub track_id: Option<TrackId>,
    pub duration_ms: Option<u64>,
    pub playing: bool,
}

impl StatusContent {
    pub fn fallback_title() -> String {
        "Music".to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("status surface unavailable: {0}")]
    Unavailable(String),
}

/// The host-facing rendering half of presence. Implementations must be
/// cheap and must never block the caller for long; all methods are invoked
/// from the controller's mutation path.
pub trait StatusSurface: Send + Sync {
    /// Show `content` and make the surface undismissable. May be rejected
    /// by the host; callers degrade to [`StatusSurface::publish`].
    fn pin(&self, content: &StatusContent) -> Result<(), SurfaceError>;

    /// Show `content` dismissably (best effort, infallible).
    fn publish(&self, content: &StatusContent);

    /// Attach artwork resolved asynchronously for the current content.
    /// Staleness is already filtered by the caller's generation check.
    fn set_artwork(&self, url: String);

    /// Remove the surface entirely.
    fn remove(&self);
}

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::engine::{EngineState, ItemMetadata, PlayerEngine};
use crate::library::TrackId;

use super::artwork::ArtworkLoader;
use super::surface::{StatusContent, StatusSurface};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PresenceState {
    /// Surface visible (or absent) and dismissable.
    Detached,
    /// Surface held undismissable while effectively playing.
    Pinned,
}

/// Signals the presence layer raises towards the host runtime.
#[derive(Debug, PartialEq, Eq)]
pub enum PresenceSignal {
    /// The user dismissed the status surface: tear playback down entirely.
    Teardown,
}

struct Inner {
    state: PresenceState,
    /// False once the surface was removed; invalidates become no-ops until
    /// the next explicit start.
    surface_live: bool,
    last_item: Option<TrackId>,
}

/// Decides whether the player currently deserves an undismissable foreground
/// slot, and keeps the status surface in sync with playback.
///
/// External triggers map one-to-one to methods: START → [`Self::start`],
/// INVALIDATE → [`Self::invalidate`], STOP → [`Self::stop`], plus the
/// dismissal signal → [`Self::dismissed`]. All failures degrade; none ever
/// propagate to the caller.
pub struct PresenceManager {
    surface: Arc<dyn StatusSurface>,
    engine: Arc<dyn PlayerEngine>,
    artwork: Arc<ArtworkLoader>,
    signals: Sender<PresenceSignal>,
    inner: Mutex<Inner>,
}

impl PresenceManager {
    pub fn new(
        surface: Arc<dyn StatusSurface>,
        engine: Arc<dyn PlayerEngine>,
        artwork: Arc<ArtworkLoader>,
        signals: Sender<PresenceSignal>,
    ) -> Self {
        Self {
            surface,
            engine,
            artwork,
            signals,
            inner: Mutex::new(Inner {
                state: PresenceState::Detached,
                surface_live: false,
                last_item: None,
            }),
        }
    }

    pub fn state(&self) -> PresenceState {
        self.inner
            .lock()
            .map(|i| i.state)
            .unwrap_or(PresenceState::Detached)
    }

    /// Ended is the only terminal exception: buffering still counts as
    /// playing so the pin survives it.
    fn effective_playing(&self) -> bool {
        self.engine.state() != EngineState::Ended && self.engine.play_intent()
    }

    fn content(&self, meta: Option<&ItemMetadata>) -> StatusContent {
        let title = meta
            .map(|m| m.title.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(StatusContent::fallback_title);
        let artist = meta
            .and_then(|m| m.artist.as_deref())
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        StatusContent {
            title,
            artist,
            track_id: meta.map(|m| m.id),
            duration_ms: meta.map(|m| m.duration_ms),
            playing: self.engine.is_playing(),
        }
    }

    /// The start command must pin quickly, so it publishes a minimal
    /// placeholder (no artwork) and pins synchronously.
    /// A rejected pin degrades to a dismissable surface; a pause that raced
    /// the start detaches again immediately.
    pub fn start(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.surface_live = true;

        let placeholder = self.content(self.engine.current_metadata().as_ref());

        if !self.effective_playing() {
            self.surface.publish(&placeholder);
            inner.state = PresenceState::Detached;
            return;
        }

        match self.surface.pin(&placeholder) {
            Ok(()) => {
                inner.state = PresenceState::Pinned;
                if !self.effective_playing() {
                    inner.state = PresenceState::Detached;
                    self.surface.publish(&placeholder);
                }
            }
            Err(e) => {
                warn!(error = %e, "pin rejected; degrading to dismissable status");
                self.surface.publish(&placeholder);
                inner.state = PresenceState::Detached;
            }
        }
    }

    /// Recompute and re-render the surface from current playback, without
    /// changing playback itself.
    pub fn invalidate(&self) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if !inner.surface_live {
            return;
        }

        let meta = self.engine.current_metadata();

        // New current item: everything fetched for the old one is stale.
        let item = meta.as_ref().map(|m| m.id);
        if item != inner.last_item {
            self.artwork.advance();
            inner.last_item = item;
        }

        let content = self.content(meta.as_ref());

        if self.effective_playing() {
            match self.surface.pin(&content) {
                Ok(()) => inner.state = PresenceState::Pinned,
                Err(e) => {
                    warn!(error = %e, "pin rejected; degrading to dismissable status");
                    self.surface.publish(&content);
                    inner.state = PresenceState::Detached;
                }
            }
        } else {
            inner.state = PresenceState::Detached;
            self.surface.publish(&content);
        }

        if let Some(art) = meta.and_then(|m| m.artwork) {
            let surface = self.surface.clone();
            self.artwork.fetch(art, move |url| surface.set_artwork(url));
        }
    }

    /// STOP trigger: always release the pin; optionally remove the surface.
    pub fn stop(&self, remove_surface: bool) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.state = PresenceState::Detached;

        if remove_surface {
            self.artwork.advance();
            inner.surface_live = false;
            inner.last_item = None;
            self.surface.remove();
        } else {
            let content = self.content(self.engine.current_metadata().as_ref());
            self.surface.publish(&content);
        }
    }

    /// The user swiped the surface away: tear down playback entirely,
    /// whatever state we were in.
    pub fn dismissed(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = PresenceState::Detached;
            inner.surface_live = false;
            inner.last_item = None;
        }
        self.surface.remove();
        let _ = self.signals.send(PresenceSignal::Teardown);
    }
}

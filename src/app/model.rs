//! Application model types: `App` and `LibraryView`.

use std::collections::VecDeque;

use crate::controller::PlaybackState;
use crate::library::{LibraryUpdate, Track, TrackId};

/// What the track list currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryView {
    Loading,
    Failed(String),
    Ready(Vec<Track>),
}

/// The main application model. Snapshots flow in from the playback store
/// and the library feed; the UI renders whatever is here.
pub struct App {
    pub view: LibraryView,
    pub selected: usize,
    pub playback: PlaybackState,
    pub detail_open: bool,
    pub should_quit: bool,

    /// Detail requests that arrived before the library finished loading.
    /// Replayed in arrival order once tracks are available.
    pending_detail: VecDeque<Option<TrackId>>,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: LibraryView::Loading,
            selected: 0,
            playback: PlaybackState::default(),
            detail_open: false,
            should_quit: false,
            pending_detail: VecDeque::new(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        match &self.view {
            LibraryView::Ready(tracks) => tracks,
            _ => &[],
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks().is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks().get(self.selected)
    }

    /// The track the playback snapshot names as current, if it is in view.
    pub fn current_track(&self) -> Option<&Track> {
        let id = self.playback.current_track_id?;
        self.tracks().iter().find(|t| t.id == id)
    }

    pub fn apply_library(&mut self, update: LibraryUpdate) {
        self.view = match update {
            LibraryUpdate::Loading => LibraryView::Loading,
            LibraryUpdate::Failed(reason) => LibraryView::Failed(reason),
            LibraryUpdate::Loaded(tracks) => LibraryView::Ready(tracks),
        };

        let len = self.tracks().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }

        if matches!(self.view, LibraryView::Ready(_)) {
            while let Some(request) = self.pending_detail.pop_front() {
                self.open_detail(request);
            }
        }
    }

    pub fn apply_playback(&mut self, snapshot: PlaybackState) {
        self.playback = snapshot;
    }

    /// Open the now-playing detail view, or queue the request while the
    /// library is still loading.
    pub fn request_detail(&mut self, track_id: Option<TrackId>) {
        if matches!(self.view, LibraryView::Ready(_)) {
            self.open_detail(track_id);
        } else {
            self.pending_detail.push_back(track_id);
        }
    }

    fn open_detail(&mut self, track_id: Option<TrackId>) {
        if let Some(id) = track_id
            && let Some(pos) = self.tracks().iter().position(|t| t.id == id)
        {
            self.selected = pos;
        }
        self.detail_open = true;
    }

    pub fn close_detail(&mut self) {
        self.detail_open = false;
    }

    pub fn toggle_detail(&mut self) {
        if self.detail_open {
            self.close_detail();
        } else {
            self.request_detail(self.playback.current_track_id);
        }
    }

    /// Move selection to the next track, wrapping.
    pub fn next(&mut self) {
        let len = self.tracks().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move selection to the previous track, wrapping.
    pub fn prev(&mut self) {
        let len = self.tracks().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

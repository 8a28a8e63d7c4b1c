//! Engine-facing value types shared by backends, the controller and tests.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::Deserialize;

use crate::library::{Track, TrackId};

/// Coarse engine lifecycle state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// No queue loaded (or the queue was cleared).
    Idle,
    Buffering,
    /// Queue loaded and playable.
    Ready,
    /// Natural end of the queue with nothing further to repeat.
    Ended,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// Wrap around to the start of the queue.
    All,
    /// Repeat the current track when it ends.
    One,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::All
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransitionReason {
    /// The previous item finished and the engine advanced on its own.
    Auto,
    /// A skip or queue replacement moved the current item.
    Requested,
}

/// Events a backend pushes towards the controller. Delivery order matches
/// emission order; the controller serializes them with user commands.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    IsPlayingChanged(bool),
    StateChanged(EngineState),
    ItemTransitioned {
        item_id: Option<TrackId>,
        reason: TransitionReason,
    },
    MetadataChanged,
}

/// One entry of the engine's loaded queue.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub id: TrackId,
    pub source: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub artwork: Option<PathBuf>,
    pub duration_ms: u64,
}

impl From<&Track> for QueueItem {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id,
            source: track.path.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            artwork: track.artwork.clone(),
            duration_ms: track.duration_ms,
        }
    }
}

/// Metadata of the currently loaded item, as the engine reports it.
#[derive(Debug, Clone)]
pub struct ItemMetadata {
    pub id: TrackId,
    pub title: String,
    pub artist: Option<String>,
    pub artwork: Option<PathBuf>,
    pub duration_ms: u64,
}

impl From<&QueueItem> for ItemMetadata {
    fn from(item: &QueueItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            artist: item.artist.clone(),
            artwork: item.artwork.clone(),
            duration_ms: item.duration_ms,
        }
    }
}

/// Outbound event channel handed to a backend at construction.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<EngineEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: EngineEvent) {
        // A closed receiver means the controller is gone; nothing to do.
        let _ = self.tx.send(event);
    }
}

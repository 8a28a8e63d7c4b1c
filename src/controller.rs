//! The playback core: one authoritative [`PlaybackState`], mutated only by
//! a single actor thread that serializes user commands and engine events.
//!
//! [`Controller`] is the handle the rest of the player talks to. Command
//! methods never block: they enqueue a message and return, and effects are
//! observed through the [`PlaybackStore`] snapshot stream.

mod actor;
mod progress;
mod state;
mod store;

pub use state::PlaybackState;
pub use store::PlaybackStore;

pub use crate::engine::RepeatMode;


use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::engine::{EngineEvent, PlayerEngine};
use crate::library::{Track, TrackId};
use crate::presence::PresenceManager;

use actor::Actor;

/// Skip-back policy: `previous()` restarts the current track instead of
/// moving back once this much of it has elapsed.
pub const PREVIOUS_RESTART_THRESHOLD_MS: u64 = 3_000;

/// Cadence of the position refresh loop while playing.
pub const PROGRESS_TICK_MS: u64 = 500;

pub(crate) enum Msg {
    Command(Command),
    Engine(EngineEvent),
    Tick,
    Shutdown,
}

pub(crate) enum Command {
    SetQueueAndPlay {
        tracks: Vec<Track>,
        start_track_id: TrackId,
    },
    TogglePlayPause,
    Pause,
    Resume,
    Next,
    Previous,
    SeekTo(u64),
    SetRepeatMode(RepeatMode),
    SetShuffleEnabled(bool),
    StopAndReset,
}

pub struct Controller {
    tx: Sender<Msg>,
    store: Arc<PlaybackStore>,
    join: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Controller {
    /// Start the actor thread. `events` must be the receiving end of the
    /// [`crate::engine::EventSink`] the engine was built with, so that
    /// engine callbacks and user commands funnel into the same queue.
    pub fn spawn(
        engine: Arc<dyn PlayerEngine>,
        events: Receiver<EngineEvent>,
        presence: Arc<PresenceManager>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Msg>();
        let store = Arc::new(PlaybackStore::new());

        // Engine events join the single mutation path through the same
        // channel as commands; this forwarder ends when the engine does.
        let event_tx = tx.clone();
        thread::spawn(move || {
            while let Ok(ev) = events.recv() {
                if event_tx.send(Msg::Engine(ev)).is_err() {
                    break;
                }
            }
        });

        let actor = Actor::new(engine, store.clone(), presence, tx.clone());
        let join = thread::spawn(move || actor.run(rx));

        Self {
            tx,
            store,
            join: std::sync::Mutex::new(Some(join)),
        }
    }

    pub fn store(&self) -> Arc<PlaybackStore> {
        self.store.clone()
    }

    fn send(&self, command: Command) {
        let _ = self.tx.send(Msg::Command(command));
    }

    pub fn set_queue_and_play(&self, tracks: Vec<Track>, start_track_id: TrackId) {
        self.send(Command::SetQueueAndPlay {
            tracks,
            start_track_id,
        });
    }

    pub fn toggle_play_pause(&self) {
        self.send(Command::TogglePlayPause);
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    pub fn next(&self) {
        self.send(Command::Next);
    }

    pub fn previous(&self) {
        self.send(Command::Previous);
    }

    pub fn seek_to(&self, position_ms: u64) {
        self.send(Command::SeekTo(position_ms));
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.send(Command::SetRepeatMode(mode));
    }

    pub fn set_shuffle_enabled(&self, enabled: bool) {
        self.send(Command::SetShuffleEnabled(enabled));
    }

    pub fn stop_and_reset(&self) {
        self.send(Command::StopAndReset);
    }

    /// Stop the actor after draining everything queued before this call.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

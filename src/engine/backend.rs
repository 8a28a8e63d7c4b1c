use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::library::TrackId;

use super::PlayerEngine;
use super::thread::spawn_engine_thread;
use super::types::{EngineState, EventSink, ItemMetadata, QueueItem, RepeatMode};

pub(super) enum EngineCmd {
    LoadQueue {
        items: Vec<QueueItem>,
        start_index: usize,
        start_position_ms: u64,
    },
    Play,
    Pause,
    Prepare,
    SeekTo(u64),
    SkipNext,
    SkipPrevious,
    SetRepeatMode(RepeatMode),
    SetShuffleEnabled(bool),
    ClearQueue,
    Stop,
    Quit,
}

/// Query mirror kept up to date by the engine thread; at most one command
/// interval (200 ms) stale, which the 500 ms refresh cadence tolerates.
pub(super) struct SharedView {
    pub position_ms: u64,
    pub duration_ms: u64,
    pub current: Option<ItemMetadata>,
    pub item_count: usize,
    pub state: EngineState,
    pub is_playing: bool,
    pub play_intent: bool,
}

impl Default for SharedView {
    fn default() -> Self {
        Self {
            position_ms: 0,
            duration_ms: 0,
            current: None,
            item_count: 0,
            state: EngineState::Idle,
            is_playing: false,
            play_intent: false,
        }
    }
}

/// `rodio`-backed engine. Commands are forwarded to a dedicated audio
/// thread; queries read a mirror of that thread's state.
pub struct RodioEngine {
    tx: Sender<EngineCmd>,
    shared: Arc<Mutex<SharedView>>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioEngine {
    pub fn spawn(events: EventSink) -> Self {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(Mutex::new(SharedView::default()));
        let join = spawn_engine_thread(rx, events, shared.clone());
        Self {
            tx,
            shared,
            join: Mutex::new(Some(join)),
        }
    }

    fn send(&self, cmd: EngineCmd) {
        // The audio thread only exits on Quit or when no device exists;
        // either way a failed send is safe to drop.
        let _ = self.tx.send(cmd);
    }

    pub fn shutdown(&self) {
        self.send(EngineCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }

    fn view<T>(&self, read: impl FnOnce(&SharedView) -> T, fallback: T) -> T {
        self.shared.lock().map(|v| read(&v)).unwrap_or(fallback)
    }
}

impl PlayerEngine for RodioEngine {
    fn load_queue(&self, items: Vec<QueueItem>, start_index: usize, start_position_ms: u64) {
        self.send(EngineCmd::LoadQueue {
            items,
            start_index,
            start_position_ms,
        });
    }

    fn play(&self) {
        self.send(EngineCmd::Play);
    }

    fn pause(&self) {
        self.send(EngineCmd::Pause);
    }

    fn prepare(&self) {
        self.send(EngineCmd::Prepare);
    }

    fn seek_to(&self, position_ms: u64) {
        self.send(EngineCmd::SeekTo(position_ms));
    }

    fn skip_next(&self) {
        self.send(EngineCmd::SkipNext);
    }

    fn skip_previous(&self) {
        self.send(EngineCmd::SkipPrevious);
    }

    fn set_repeat_mode(&self, mode: RepeatMode) {
        self.send(EngineCmd::SetRepeatMode(mode));
    }

    fn set_shuffle_enabled(&self, enabled: bool) {
        self.send(EngineCmd::SetShuffleEnabled(enabled));
    }

    fn clear_queue(&self) {
        self.send(EngineCmd::ClearQueue);
    }

    fn stop(&self) {
        self.send(EngineCmd::Stop);
    }

    fn position_ms(&self) -> u64 {
        self.view(|v| v.position_ms, 0)
    }

    fn duration_ms(&self) -> u64 {
        self.view(|v| v.duration_ms, 0)
    }

    fn current_item_id(&self) -> Option<TrackId> {
        self.view(|v| v.current.as_ref().map(|m| m.id), None)
    }

    fn current_metadata(&self) -> Option<ItemMetadata> {
        self.view(|v| v.current.clone(), None)
    }

    fn item_count(&self) -> usize {
        self.view(|v| v.item_count, 0)
    }

    fn state(&self) -> EngineState {
        self.view(|v| v.state, EngineState::Idle)
    }

    fn is_playing(&self) -> bool {
        self.view(|v| v.is_playing, false)
    }

    fn play_intent(&self) -> bool {
        self.view(|v| v.play_intent, false)
    }
}

//! Deterministic in-process engine for controller and presence tests.
//!
//! Commands take effect synchronously and emit the same events the real
//! backend would, so tests can drive exact scenarios (lost queues, scripted
//! positions, terminal states) without an audio device.

use std::sync::Mutex;

use crate::library::TrackId;

use super::PlayerEngine;
use super::types::{
    EngineEvent, EngineState, EventSink, ItemMetadata, QueueItem, RepeatMode, TransitionReason,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCmd {
    LoadQueue {
        ids: Vec<TrackId>,
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
}

struct Inner {
    items: Vec<QueueItem>,
    current: Option<usize>,
    position_ms: u64,
    playing: bool,
    play_intent: bool,
    state: EngineState,
}

pub struct FakeEngine {
    events: EventSink,
    inner: Mutex<Inner>,
    commands: Mutex<Vec<RecordedCmd>>,
}

impl FakeEngine {
    pub fn new(events: EventSink) -> Self {
        Self {
            events,
            inner: Mutex::new(Inner {
                items: Vec::new(),
                current: None,
                position_ms: 0,
                playing: false,
                play_intent: false,
                state: EngineState::Idle,
            }),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<RecordedCmd> {
        self.commands.lock().unwrap().clone()
    }

    fn record(&self, cmd: RecordedCmd) {
        self.commands.lock().unwrap().push(cmd);
    }

    /// Script the playhead without emitting anything.
    pub fn set_position_ms(&self, ms: u64) {
        self.inner.lock().unwrap().position_ms = ms;
    }

    /// Script a lifecycle state (e.g. Ended, Buffering) without events.
    pub fn set_state(&self, state: EngineState) {
        self.inner.lock().unwrap().state = state;
    }

    /// Simulate losing all in-memory queue state, as after a host restart.
    /// No events: the process holding the old state is simply gone.
    pub fn drop_loaded_queue(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.items.clear();
        inner.current = None;
        inner.position_ms = 0;
        inner.playing = false;
        inner.play_intent = false;
        inner.state = EngineState::Idle;
    }

    pub fn emit(&self, event: EngineEvent) {
        self.events.emit(event);
    }

    fn transition(&self, inner: &mut Inner, index: usize) {
        inner.current = Some(index);
        inner.position_ms = 0;
        self.events.emit(EngineEvent::ItemTransitioned {
            item_id: Some(inner.items[index].id),
            reason: TransitionReason::Requested,
        });
        self.events.emit(EngineEvent::MetadataChanged);
    }

    fn set_playing(&self, inner: &mut Inner, playing: bool) {
        inner.play_intent = playing;
        if inner.playing != playing {
            inner.playing = playing;
            self.events.emit(EngineEvent::IsPlayingChanged(playing));
        }
    }
}

impl PlayerEngine for FakeEngine {
    fn load_queue(&self, items: Vec<QueueItem>, start_index: usize, start_position_ms: u64) {
        self.record(RecordedCmd::LoadQueue {
            ids: items.iter().map(|i| i.id).collect(),
            start_index,
            start_position_ms,
        });
        let mut inner = self.inner.lock().unwrap();
        inner.items = items;
        if inner.items.is_empty() {
            inner.current = None;
            inner.state = EngineState::Idle;
            self.events.emit(EngineEvent::ItemTransitioned {
                item_id: None,
                reason: TransitionReason::Requested,
            });
            self.events.emit(EngineEvent::StateChanged(EngineState::Idle));
            return;
        }
        let start = start_index.min(inner.items.len() - 1);
        inner.state = EngineState::Ready;
        inner.position_ms = start_position_ms;
        inner.current = Some(start);
        self.events.emit(EngineEvent::ItemTransitioned {
            item_id: Some(inner.items[start].id),
            reason: TransitionReason::Requested,
        });
        self.events.emit(EngineEvent::MetadataChanged);
        self.events.emit(EngineEvent::StateChanged(EngineState::Ready));
    }

    fn play(&self) {
        self.record(RecordedCmd::Play);
        let mut inner = self.inner.lock().unwrap();
        if inner.current.is_some() {
            self.set_playing(&mut inner, true);
        }
    }

    fn pause(&self) {
        self.record(RecordedCmd::Pause);
        let mut inner = self.inner.lock().unwrap();
        self.set_playing(&mut inner, false);
    }

    fn prepare(&self) {
        self.record(RecordedCmd::Prepare);
        let mut inner = self.inner.lock().unwrap();
        if inner.state == EngineState::Idle && !inner.items.is_empty() {
            inner.state = EngineState::Ready;
            if inner.current.is_none() {
                inner.current = Some(0);
            }
            self.events.emit(EngineEvent::StateChanged(EngineState::Ready));
        }
    }

    fn seek_to(&self, position_ms: u64) {
        self.record(RecordedCmd::SeekTo(position_ms));
        let mut inner = self.inner.lock().unwrap();
        let duration = inner
            .current
            .and_then(|i| inner.items.get(i))
            .map_or(0, |item| item.duration_ms);
        inner.position_ms = if duration > 0 {
            position_ms.min(duration)
        } else {
            position_ms
        };
    }

    fn skip_next(&self) {
        self.record(RecordedCmd::SkipNext);
        let mut inner = self.inner.lock().unwrap();
        if let Some(i) = inner.current {
            let next = (i + 1) % inner.items.len();
            self.transition(&mut inner, next);
        }
    }

    fn skip_previous(&self) {
        self.record(RecordedCmd::SkipPrevious);
        let mut inner = self.inner.lock().unwrap();
        if let Some(i) = inner.current {
            let len = inner.items.len();
            let prev = (i + len - 1) % len;
            self.transition(&mut inner, prev);
        }
    }

    fn set_repeat_mode(&self, mode: RepeatMode) {
        self.record(RecordedCmd::SetRepeatMode(mode));
    }

    fn set_shuffle_enabled(&self, enabled: bool) {
        self.record(RecordedCmd::SetShuffleEnabled(enabled));
    }

    fn clear_queue(&self) {
        self.record(RecordedCmd::ClearQueue);
        let mut inner = self.inner.lock().unwrap();
        inner.items.clear();
        inner.current = None;
        inner.position_ms = 0;
        inner.state = EngineState::Idle;
        self.events.emit(EngineEvent::ItemTransitioned {
            item_id: None,
            reason: TransitionReason::Requested,
        });
        self.events.emit(EngineEvent::StateChanged(EngineState::Idle));
    }

    fn stop(&self) {
        self.record(RecordedCmd::Stop);
        let mut inner = self.inner.lock().unwrap();
        self.set_playing(&mut inner, false);
        inner.state = EngineState::Idle;
    }

    fn position_ms(&self) -> u64 {
        self.inner.lock().unwrap().position_ms
    }

    fn duration_ms(&self) -> u64 {
        let inner = self.inner.lock().unwrap();
        inner
            .current
            .and_then(|i| inner.items.get(i))
            .map_or(0, |item| item.duration_ms)
    }

    fn current_item_id(&self) -> Option<TrackId> {
        let inner = self.inner.lock().unwrap();
        inner.current.and_then(|i| inner.items.get(i)).map(|m| m.id)
    }

    fn current_metadata(&self) -> Option<ItemMetadata> {
        let inner = self.inner.lock().unwrap();
        inner.current.and_then(|i| inner.items.get(i)).map(Into::into)
    }

    fn item_count(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    fn state(&self) -> EngineState {
        self.inner.lock().unwrap().state
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().unwrap().playing
    }

    fn play_intent(&self) -> bool {
        self.inner.lock().unwrap().play_intent
    }
}

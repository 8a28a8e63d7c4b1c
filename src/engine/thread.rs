use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{error, warn};

use super::backend::{EngineCmd, SharedView};
use super::queue::{build_order, next_in_order, order_position, previous_in_order};
use super::sink::create_sink_at;
use super::types::{EngineEvent, EngineState, EventSink, QueueItem, RepeatMode, TransitionReason};

pub(super) fn spawn_engine_thread(
    rx: Receiver<EngineCmd>,
    events: EventSink,
    shared: Arc<Mutex<SharedView>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                // Leave the engine inert rather than crash the player.
                error!(error = %e, "no audio output device; engine disabled");
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        let mut stream = stream;
        stream.log_on_drop(false);

        let mut core = Core {
            stream,
            items: Vec::new(),
            order: Vec::new(),
            order_pos: 0,
            current: None,
            sink: None,
            paused: true,
            started_at: None,
            accumulated: Duration::ZERO,
            repeat: RepeatMode::default(),
            shuffle: false,
            state: EngineState::Idle,
            events,
        };
        core.mirror(&shared);

        loop {
            match rx.recv_timeout(Duration::from_millis(200)) {
                Ok(EngineCmd::Quit) => {
                    if let Some(s) = core.sink.as_ref() {
                        s.stop();
                    }
                    break;
                }
                Ok(cmd) => {
                    core.handle(cmd);
                    core.mirror(&shared);
                }
                Err(RecvTimeoutError::Timeout) => {
                    core.auto_advance();
                    core.mirror(&shared);
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

struct Core {
    stream: OutputStream,
    items: Vec<QueueItem>,
    order: Vec<usize>,
    order_pos: usize,
    current: Option<usize>,
    sink: Option<Sink>,
    /// Transport intent; `true` until `play`, again after `pause`/`stop`.
    paused: bool,
    started_at: Option<Instant>,
    accumulated: Duration,
    repeat: RepeatMode,
    shuffle: bool,
    state: EngineState,
    events: EventSink,
}

impl Core {
    fn handle(&mut self, cmd: EngineCmd) {
        match cmd {
            EngineCmd::LoadQueue {
                items,
                start_index,
                start_position_ms,
            } => self.load_queue(items, start_index, start_position_ms),
            EngineCmd::Play => self.play(),
            EngineCmd::Pause => self.pause(),
            EngineCmd::Prepare => self.prepare(),
            EngineCmd::SeekTo(ms) => self.seek_to(ms),
            EngineCmd::SkipNext => self.skip(true),
            EngineCmd::SkipPrevious => self.skip(false),
            EngineCmd::SetRepeatMode(mode) => self.repeat = mode,
            EngineCmd::SetShuffleEnabled(enabled) => self.set_shuffle(enabled),
            EngineCmd::ClearQueue => self.clear_queue(),
            EngineCmd::Stop => self.stop(),
            EngineCmd::Quit => unreachable!("handled by the loop"),
        }
    }

    fn load_queue(&mut self, items: Vec<QueueItem>, start_index: usize, start_position_ms: u64) {
        if let Some(s) = self.sink.as_ref() {
            s.stop();
        }
        self.sink = None;
        self.paused = true;
        self.started_at = None;
        self.accumulated = Duration::from_millis(start_position_ms);

        self.items = items;
        self.order = build_order(self.items.len(), self.shuffle);

        if self.items.is_empty() {
            self.current = None;
            self.order_pos = 0;
            self.state = EngineState::Idle;
            self.events.emit(EngineEvent::ItemTransitioned {
                item_id: None,
                reason: TransitionReason::Requested,
            });
            self.events.emit(EngineEvent::StateChanged(EngineState::Idle));
            return;
        }

        let start = start_index.min(self.items.len() - 1);
        self.current = Some(start);
        self.order_pos = order_position(&self.order, start);
        self.cue_current(self.accumulated);
        self.state = EngineState::Ready;

        self.events.emit(EngineEvent::ItemTransitioned {
            item_id: Some(self.items[start].id),
            reason: TransitionReason::Requested,
        });
        self.events.emit(EngineEvent::MetadataChanged);
        self.events.emit(EngineEvent::StateChanged(EngineState::Ready));
    }

    /// Build a paused sink for the current item starting at `at`.
    fn cue_current(&mut self, at: Duration) {
        self.sink = None;
        let Some(i) = self.current else { return };
        match create_sink_at(&self.stream, &self.items[i], at) {
            Ok(sink) => self.sink = Some(sink),
            Err(e) => warn!(error = %e, "failed to cue track"),
        }
        self.accumulated = at;
        self.started_at = None;
    }

    fn play(&mut self) {
        if self.current.is_none() {
            return;
        }
        if self.sink.is_none() {
            self.cue_current(self.accumulated);
        }
        let was_paused = self.paused;
        if let Some(s) = self.sink.as_ref() {
            s.play();
        }
        self.paused = false;
        self.started_at = Some(Instant::now());
        if was_paused {
            self.events.emit(EngineEvent::IsPlayingChanged(true));
        }
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
        if !self.paused {
            self.paused = true;
            self.events.emit(EngineEvent::IsPlayingChanged(false));
        }
    }

    fn prepare(&mut self) {
        if self.state != EngineState::Idle || self.items.is_empty() {
            return;
        }
        if self.current.is_none() {
            self.current = Some(self.order.first().copied().unwrap_or(0));
            self.order_pos = 0;
        }
        self.cue_current(Duration::ZERO);
        self.state = EngineState::Ready;
        self.events.emit(EngineEvent::StateChanged(EngineState::Ready));
    }

    fn seek_to(&mut self, position_ms: u64) {
        if self.current.is_none() {
            return;
        }
        // Scrubbing: rebuild the sink and skip into the file, clamped to the
        // track length when known.
        let duration = self.duration_ms();
        let target = if duration > 0 {
            position_ms.min(duration)
        } else {
            position_ms
        };

        let resume = !self.paused;
        self.cue_current(Duration::from_millis(target));
        if resume {
            if let Some(s) = self.sink.as_ref() {
                s.play();
            }
            self.started_at = Some(Instant::now());
        }
    }

    fn skip(&mut self, forward: bool) {
        if self.items.is_empty() || self.current.is_none() {
            return;
        }
        self.order_pos = if forward {
            next_in_order(self.order_pos, self.order.len())
        } else {
            previous_in_order(self.order_pos, self.order.len())
        };
        self.transition_to(self.order[self.order_pos], TransitionReason::Requested);
    }

    /// Swap the current item, keeping the transport intent.
    fn transition_to(&mut self, item: usize, reason: TransitionReason) {
        if let Some(s) = self.sink.as_ref() {
            s.stop();
        }
        self.current = Some(item);
        self.cue_current(Duration::ZERO);
        if !self.paused {
            if let Some(s) = self.sink.as_ref() {
                s.play();
            }
            self.started_at = Some(Instant::now());
        }
        self.events.emit(EngineEvent::ItemTransitioned {
            item_id: Some(self.items[item].id),
            reason,
        });
        self.events.emit(EngineEvent::MetadataChanged);
    }

    fn set_shuffle(&mut self, enabled: bool) {
        self.shuffle = enabled;
        self.order = build_order(self.items.len(), enabled);
        if let Some(i) = self.current {
            self.order_pos = order_position(&self.order, i);
        } else {
            self.order_pos = 0;
        }
    }

    fn clear_queue(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.stop();
        }
        self.sink = None;
        self.items.clear();
        self.order.clear();
        self.order_pos = 0;
        self.current = None;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        self.state = EngineState::Idle;
        self.events.emit(EngineEvent::ItemTransitioned {
            item_id: None,
            reason: TransitionReason::Requested,
        });
        self.events.emit(EngineEvent::StateChanged(EngineState::Idle));
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.stop();
        }
        self.sink = None;
        self.started_at = None;
        self.accumulated = Duration::ZERO;
        if !self.paused {
            self.paused = true;
            self.events.emit(EngineEvent::IsPlayingChanged(false));
        }
        if self.state != EngineState::Idle {
            self.state = EngineState::Idle;
            self.events.emit(EngineEvent::StateChanged(EngineState::Idle));
        }
    }

    /// Periodic check: with repeat All/One the queue never ends on its own,
    /// it wraps or replays instead.
    fn auto_advance(&mut self) {
        let finished = !self.paused && self.sink.as_ref().is_some_and(|s| s.empty());
        if !finished || self.current.is_none() {
            return;
        }
        match self.repeat {
            RepeatMode::One => {
                let i = self.current.unwrap_or(0);
                self.transition_to(i, TransitionReason::Auto);
            }
            RepeatMode::All => {
                self.order_pos = next_in_order(self.order_pos, self.order.len());
                self.transition_to(self.order[self.order_pos], TransitionReason::Auto);
            }
        }
    }

    fn position_ms(&self) -> u64 {
        let elapsed = self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| st.elapsed());
        elapsed.as_millis() as u64
    }

    fn duration_ms(&self) -> u64 {
        self.current
            .and_then(|i| self.items.get(i))
            .map_or(0, |item| item.duration_ms)
    }

    fn mirror(&self, shared: &Mutex<SharedView>) {
        if let Ok(mut view) = shared.lock() {
            view.position_ms = self.position_ms();
            view.duration_ms = self.duration_ms();
            view.current = self
                .current
                .and_then(|i| self.items.get(i))
                .map(Into::into);
            view.item_count = self.items.len();
            view.state = self.state;
            view.is_playing = !self.paused && self.sink.is_some();
            view.play_intent = !self.paused;
        }
    }
}

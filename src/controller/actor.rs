use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};

use tracing::debug;

use crate::engine::{EngineEvent, EngineState, PlayerEngine, QueueItem};
use crate::library::{Track, TrackId};
use crate::presence::PresenceManager;

use super::progress::ProgressTicker;
use super::state::PlaybackState;
use super::store::PlaybackStore;
use super::{Command, Msg, PREVIOUS_RESTART_THRESHOLD_MS};

/// The single writer. Every mutation of playback state happens on this
/// thread, in the order messages were enqueued.
pub(super) struct Actor {
    engine: Arc<dyn PlayerEngine>,
    store: Arc<PlaybackStore>,
    presence: Arc<PresenceManager>,
    tx: Sender<Msg>,
    /// Last full queue handed to `set_queue_and_play`; kept so `resume` can
    /// rebuild the engine after it lost its in-memory queue. Live position
    /// is deliberately not retained.
    fallback_queue: Vec<Track>,
    ticker: ProgressTicker,
}

impl Actor {
    pub(super) fn new(
        engine: Arc<dyn PlayerEngine>,
        store: Arc<PlaybackStore>,
        presence: Arc<PresenceManager>,
        tx: Sender<Msg>,
    ) -> Self {
        Self {
            engine,
            store,
            presence,
            tx,
            fallback_queue: Vec::new(),
            ticker: ProgressTicker::new(),
        }
    }

    pub(super) fn run(mut self, rx: Receiver<Msg>) {
        loop {
            match rx.recv() {
                Ok(Msg::Command(cmd)) => self.handle_command(cmd),
                Ok(Msg::Engine(ev)) => self.handle_event(ev),
                Ok(Msg::Tick) => self.handle_tick(),
                Ok(Msg::Shutdown) | Err(_) => break,
            }
        }
        self.ticker.stop();
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::SetQueueAndPlay {
                tracks,
                start_track_id,
            } => self.set_queue_and_play(tracks, start_track_id),
            Command::TogglePlayPause => {
                if self.engine.is_playing() {
                    self.pause();
                } else {
                    self.resume();
                }
            }
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Next => {
                self.presence.start();
                self.engine.skip_next();
                self.engine.play();
                self.presence.invalidate();
            }
            Command::Previous => self.previous(),
            Command::SeekTo(position_ms) => {
                self.engine.seek_to(position_ms);
                let snap = self.store.snapshot();
                // The engine clamps internally; the published snapshot must
                // honor the same bound or a paused over-seek would persist a
                // position past the end of the track.
                let position_ms = if snap.duration_ms > 0 {
                    position_ms.min(snap.duration_ms)
                } else {
                    position_ms
                };
                self.store.publish(PlaybackState {
                    position_ms,
                    ..snap
                });
                self.presence.invalidate();
            }
            Command::SetRepeatMode(mode) => {
                self.engine.set_repeat_mode(mode);
                let snap = self.store.snapshot();
                self.store.publish(PlaybackState {
                    repeat_mode: mode,
                    ..snap
                });
                self.presence.invalidate();
            }
            Command::SetShuffleEnabled(enabled) => {
                self.engine.set_shuffle_enabled(enabled);
                let snap = self.store.snapshot();
                self.store.publish(PlaybackState {
                    shuffle_enabled: enabled,
                    ..snap
                });
                self.presence.invalidate();
            }
            Command::StopAndReset => self.stop_and_reset(),
        }
    }

    fn set_queue_and_play(&mut self, tracks: Vec<Track>, start_track_id: TrackId) {
        self.presence.start();

        self.fallback_queue = tracks.clone();

        let items: Vec<QueueItem> = tracks.iter().map(QueueItem::from).collect();
        let start_index = tracks
            .iter()
            .position(|t| t.id == start_track_id)
            .unwrap_or(0);

        let snap = self.store.snapshot();
        self.engine.set_repeat_mode(snap.repeat_mode);
        self.engine.set_shuffle_enabled(snap.shuffle_enabled);
        self.engine.load_queue(items, start_index, 0);
        self.engine.prepare();
        self.engine.play();

        self.store.publish(PlaybackState {
            queue_ids: tracks.iter().map(|t| t.id).collect(),
            current_track_id: tracks.get(start_index).map(|t| t.id),
            is_playing: true,
            position_ms: 0,
            duration_ms: self.engine.duration_ms(),
            repeat_mode: snap.repeat_mode,
            shuffle_enabled: snap.shuffle_enabled,
        });

        self.ticker.start(self.tx.clone());
        self.presence.invalidate();
    }

    fn pause(&mut self) {
        self.engine.pause();
        let snap = self.store.snapshot();
        self.store.publish(PlaybackState {
            is_playing: false,
            ..snap
        });
        self.ticker.stop();
        self.presence.invalidate();
    }

    fn resume(&mut self) {
        self.presence.start();

        let snap = self.store.snapshot();

        // Recovery path: the engine was restarted and lost its queue, but we
        // still know what was playing. Rebuild from the fallback queue; the
        // mid-session position is gone by design.
        if self.engine.item_count() == 0 || snap.queue_ids.is_empty() {
            let wanted = snap
                .current_track_id
                .or_else(|| self.engine.current_item_id())
                .or_else(|| self.fallback_queue.first().map(|t| t.id));

            if let Some(id) = wanted {
                if !self.fallback_queue.is_empty() {
                    debug!(track = id, "engine lost its queue; replaying fallback");
                    let tracks = self.fallback_queue.clone();
                    self.set_queue_and_play(tracks, id);
                    return;
                }
            }
        }

        if self.engine.item_count() == 0 {
            debug!("resume with nothing loaded");
            return;
        }

        if self.engine.state() == EngineState::Idle {
            self.engine.prepare();
        }
        if self.engine.state() == EngineState::Ended {
            self.engine.seek_to(0);
        }

        self.engine.play();
        self.store.publish(PlaybackState {
            is_playing: true,
            duration_ms: self.engine.duration_ms(),
            ..snap
        });
        self.ticker.start(self.tx.clone());
        self.presence.invalidate();
    }

    fn previous(&mut self) {
        self.presence.start();

        // Deep into the track, "previous" means "restart this one".
        if self.engine.position_ms() > PREVIOUS_RESTART_THRESHOLD_MS {
            self.engine.seek_to(0);
            let snap = self.store.snapshot();
            self.store.publish(PlaybackState {
                position_ms: 0,
                ..snap
            });
        } else {
            self.engine.skip_previous();
        }
        self.engine.play();
        self.presence.invalidate();
    }

    fn stop_and_reset(&mut self) {
        self.engine.pause();
        self.engine.seek_to(0);
        self.engine.clear_queue();

        self.ticker.stop();
        self.fallback_queue.clear();

        self.store.publish(PlaybackState::default());
        self.presence.stop(true);
    }

    fn handle_event(&mut self, ev: EngineEvent) {
        match ev {
            EngineEvent::IsPlayingChanged(playing) => {
                let snap = self.store.snapshot();
                self.store.publish(PlaybackState {
                    is_playing: playing,
                    duration_ms: self.engine.duration_ms(),
                    ..snap
                });
                if playing {
                    self.ticker.start(self.tx.clone());
                } else {
                    self.ticker.stop();
                }
                self.presence.invalidate();
            }
            EngineEvent::ItemTransitioned { item_id, .. } => {
                let snap = self.store.snapshot();
                let current = match item_id {
                    Some(id) if snap.queue_ids.contains(&id) => Some(id),
                    None if snap.queue_ids.is_empty() => None,
                    other => {
                        // A transition for an item we no longer track, e.g.
                        // after the queue was replaced. Drop it.
                        debug!(item = ?other, "ignoring transition outside the queue");
                        return;
                    }
                };
                self.store.publish(PlaybackState {
                    current_track_id: current,
                    position_ms: 0,
                    duration_ms: self.engine.duration_ms(),
                    ..snap
                });
                self.presence.invalidate();
            }
            EngineEvent::StateChanged(_) | EngineEvent::MetadataChanged => {
                let snap = self.store.snapshot();
                self.store.publish(PlaybackState {
                    duration_ms: self.engine.duration_ms(),
                    ..snap
                });
                self.presence.invalidate();
            }
        }
    }

    fn handle_tick(&mut self) {
        // Liveness first: a tick that raced a cancellation must not publish.
        if !self.ticker.is_active() {
            return;
        }
        let snap = self.store.snapshot();
        self.store.publish(PlaybackState {
            position_ms: self.engine.position_ms(),
            duration_ms: self.engine.duration_ms(),
            ..snap
        });
    }
}

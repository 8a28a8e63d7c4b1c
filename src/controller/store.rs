use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use super::state::PlaybackState;

struct Inner {
    latest: PlaybackState,
    subs: Vec<Sender<PlaybackState>>,
}

/// Single source of truth for playback snapshots.
///
/// Multicast with replay-latest semantics: a new subscriber immediately
/// receives the most recent snapshot, then every subsequent publish in
/// order. The store validates nothing; the actor guarantees invariants
/// before publishing.
pub struct PlaybackStore {
    inner: Mutex<Inner>,
}

impl PlaybackStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                latest: PlaybackState::default(),
                subs: Vec::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.inner
            .lock()
            .map(|inner| inner.latest.clone())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> Receiver<PlaybackState> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            let _ = tx.send(inner.latest.clone());
            inner.subs.push(tx);
        }
        rx
    }

    /// Actor-only. Publishes are totally ordered because exactly one thread
    /// ever calls this. A value equal to the latest snapshot is dropped, so
    /// redundant refreshes do not flood subscribers.
    pub(crate) fn publish(&self, next: PlaybackState) {
        if let Ok(mut inner) = self.inner.lock() {
            if inner.latest == next {
                return;
            }
            inner.latest = next.clone();
            inner.subs.retain(|sub| sub.send(next.clone()).is_ok());
        }
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}

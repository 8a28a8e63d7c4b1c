use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use super::{Msg, PROGRESS_TICK_MS};

/// The position refresh loop: a cooperative ticker that feeds `Msg::Tick`
/// into the actor queue while playing.
///
/// Starting is idempotent (a second start while live is a no-op) and
/// stopping flips a liveness flag the ticker checks before every tick, so no
/// tick is *sent* after cancellation is observed. A tick already queued when
/// the flag flips is dropped by the actor, which re-checks liveness first.
pub(super) struct ProgressTicker {
    alive: Option<Arc<AtomicBool>>,
}

impl ProgressTicker {
    pub(super) fn new() -> Self {
        Self { alive: None }
    }

    /// Returns false when a ticker was already live.
    pub(super) fn start(&mut self, tx: Sender<Msg>) -> bool {
        if self.alive.is_some() {
            return false;
        }
        let alive = Arc::new(AtomicBool::new(true));
        self.alive = Some(alive.clone());
        thread::spawn(move || {
            loop {
                thread::sleep(Duration::from_millis(PROGRESS_TICK_MS));
                if !alive.load(Ordering::Acquire) {
                    break;
                }
                if tx.send(Msg::Tick).is_err() {
                    break;
                }
            }
        });
        true
    }

    pub(super) fn stop(&mut self) {
        if let Some(alive) = self.alive.take() {
            alive.store(false, Ordering::Release);
        }
    }

    pub(super) fn is_active(&self) -> bool {
        self.alive.is_some()
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use notify::{RecursiveMode, Watcher};
use tracing::warn;

use crate::config::LibrarySettings;

use super::model::Track;
use super::scan::scan;

/// One state of the track-list stream: loading, a full list, or a failure
/// the user can retry. Empty-but-loaded is `Loaded(vec![])`, deliberately
/// distinct from both other states.
#[derive(Clone, Debug)]
pub enum LibraryUpdate {
    Loading,
    Loaded(Vec<Track>),
    Failed(String),
}

enum FeedCmd {
    Rescan,
    FsChanged,
    Quit,
}

struct Shared {
    latest: LibraryUpdate,
    subs: Vec<Sender<LibraryUpdate>>,
}

/// Push stream over the current track list.
///
/// There is no delta protocol: every change produces the full list. New
/// subscribers immediately receive the latest value.
pub struct LibraryFeed {
    shared: Arc<Mutex<Shared>>,
    tx: Sender<FeedCmd>,
}

impl LibraryFeed {
    pub fn spawn(root: PathBuf, settings: LibrarySettings) -> Self {
        let shared = Arc::new(Mutex::new(Shared {
            latest: LibraryUpdate::Loading,
            subs: Vec::new(),
        }));
        let (tx, rx) = mpsc::channel::<FeedCmd>();

        let shared_for_thread = shared.clone();
        let tx_for_watcher = tx.clone();
        thread::spawn(move || {
            run_feed(root, settings, rx, tx_for_watcher, shared_for_thread);
        });

        Self { shared, tx }
    }

    /// Subscribe to track-list updates; the latest value is delivered first.
    pub fn subscribe(&self) -> Receiver<LibraryUpdate> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut shared) = self.shared.lock() {
            let _ = tx.send(shared.latest.clone());
            shared.subs.push(tx);
        }
        rx
    }

    pub fn latest(&self) -> LibraryUpdate {
        self.shared
            .lock()
            .map(|s| s.latest.clone())
            .unwrap_or(LibraryUpdate::Loading)
    }

    /// Retry affordance: force a fresh scan, going through `Loading` first.
    pub fn rescan(&self) {
        let _ = self.tx.send(FeedCmd::Rescan);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(FeedCmd::Quit);
    }
}

fn publish(shared: &Mutex<Shared>, update: LibraryUpdate) {
    if let Ok(mut shared) = shared.lock() {
        shared.latest = update.clone();
        shared.subs.retain(|sub| sub.send(update.clone()).is_ok());
    }
}

fn run_scan(root: &PathBuf, settings: &LibrarySettings, shared: &Mutex<Shared>) {
    publish(shared, LibraryUpdate::Loading);
    match scan(root, settings) {
        Ok(tracks) => publish(shared, LibraryUpdate::Loaded(tracks)),
        Err(e) => {
            warn!(root = %root.display(), error = %e, "library scan failed");
            publish(shared, LibraryUpdate::Failed(e.to_string()));
        }
    }
}

fn run_feed(
    root: PathBuf,
    settings: LibrarySettings,
    rx: Receiver<FeedCmd>,
    tx: Sender<FeedCmd>,
    shared: Arc<Mutex<Shared>>,
) {
    run_scan(&root, &settings, &shared);

    // Watch the root so added/removed files re-emit the list. Watch failures
    // only lose auto-refresh; manual rescan still works.
    let _watcher = match notify::recommended_watcher(move |res: Result<notify::Event, _>| {
        if res.is_ok() {
            let _ = tx.send(FeedCmd::FsChanged);
        }
    }) {
        Ok(mut watcher) => match watcher.watch(&root, RecursiveMode::Recursive) {
            Ok(()) => Some(watcher),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "library watch unavailable");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "failed to create filesystem watcher");
            None
        }
    };

    loop {
        match rx.recv() {
            Ok(FeedCmd::Rescan) => run_scan(&root, &settings, &shared),
            Ok(FeedCmd::FsChanged) => {
                // Debounce bursts of filesystem events before rescanning.
                loop {
                    match rx.recv_timeout(Duration::from_millis(500)) {
                        Ok(FeedCmd::FsChanged) => continue,
                        Ok(FeedCmd::Rescan) => break,
                        Ok(FeedCmd::Quit) => return,
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                run_scan(&root, &settings, &shared);
            }
            Ok(FeedCmd::Quit) | Err(_) => break,
        }
    }
}

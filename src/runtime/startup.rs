use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use crate::app::App;
use crate::config::Settings;
use crate::controller::{Controller, PlaybackState};
use crate::engine::{EventSink, PlayerEngine, RodioEngine};
use crate::library::{LibraryFeed, LibraryUpdate};
use crate::mpris::{ControlCmd, spawn_mpris};
use crate::presence::{ArtworkLoader, PresenceManager, PresenceSignal};

/// Everything the event loop needs, built once at startup.
pub struct Runtime {
    pub settings: Settings,
    pub app: App,
    pub controller: Controller,
    pub engine: Arc<RodioEngine>,
    pub presence: Arc<PresenceManager>,
    pub feed: LibraryFeed,
    pub control_rx: Receiver<ControlCmd>,
    pub presence_rx: Receiver<PresenceSignal>,
    pub playback_rx: Receiver<PlaybackState>,
    pub library_rx: Receiver<LibraryUpdate>,
}

pub fn build(settings: Settings) -> Runtime {
    let (sink, events) = EventSink::channel();
    let engine = Arc::new(RodioEngine::spawn(sink));

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = spawn_mpris(control_tx);

    let artwork = Arc::new(ArtworkLoader::new(artwork_cache_dir()));
    let (signal_tx, presence_rx) = mpsc::channel();
    let presence = Arc::new(PresenceManager::new(
        mpris,
        engine.clone() as Arc<dyn PlayerEngine>,
        artwork,
        signal_tx,
    ));

    let controller = Controller::spawn(
        engine.clone() as Arc<dyn PlayerEngine>,
        events,
        presence.clone(),
    );
    controller.set_repeat_mode(settings.playback.repeat);
    controller.set_shuffle_enabled(settings.playback.shuffle);

    let feed = LibraryFeed::spawn(settings.library_root(), settings.library.clone());

    let playback_rx = controller.store().subscribe();
    let library_rx = feed.subscribe();

    Runtime {
        settings,
        app: App::new(),
        controller,
        engine,
        presence,
        feed,
        control_rx,
        presence_rx,
        playback_rx,
        library_rx,
    }
}

impl Runtime {
    /// Orderly shutdown: playback first, then the actor and audio threads.
    pub fn teardown(self) {
        self.controller.stop_and_reset();
        self.controller.shutdown();
        self.engine.shutdown();
        self.feed.shutdown();
    }
}

/// `$XDG_CACHE_HOME/vivace/artwork` or `~/.cache/vivace/artwork`.
fn artwork_cache_dir() -> PathBuf {
    if let Some(xdg) = env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(xdg).join("vivace").join("artwork");
    }
    env::var_os("HOME")
        .map(|h| PathBuf::from(h).join(".cache").join("vivace").join("artwork"))
        .unwrap_or_else(env::temp_dir)
}

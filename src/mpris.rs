//! MPRIS session-bus surface.
//!
//! This is the host-facing half of presence: the D-Bus interfaces mirror
//! what the status surface currently shows, and incoming method calls are
//! forwarded to the runtime as [`ControlCmd`]s. A pinned surface reports
//! `CanQuit = false`; `Quit` on a dismissable surface is the dismissal
//! gesture and tears playback down.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::warn;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::presence::{StatusContent, StatusSurface, SurfaceError};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.vivace";

/// Remote control commands arriving over the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    /// Dismissal of the status surface.
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    /// `Raise`: the user asked for the now-playing detail view.
    OpenDetail,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ConnStatus {
    /// Bus registration still in flight; pins are accepted optimistically.
    Pending,
    Up,
    Failed,
}

#[derive(Debug)]
struct SharedState {
    content: Option<StatusContent>,
    pinned: bool,
    art_url: Option<String>,
    conn: ConnStatus,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            content: None,
            pinned: false,
            art_url: None,
            conn: ConnStatus::Pending,
        }
    }
}

/// Writer half handed to the presence manager. All mutations mark the
/// shared state dirty; the bus thread picks that up and emits the
/// PropertiesChanged signals.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    dirty: Arc<AtomicBool>,
}

impl MprisHandle {
    fn mutate(&self, f: impl FnOnce(&mut SharedState)) {
        if let Ok(mut s) = self.state.lock() {
            f(&mut s);
        }
        self.dirty.store(true, Ordering::SeqCst);
    }
}

impl StatusSurface for MprisHandle {
    fn pin(&self, content: &StatusContent) -> Result<(), SurfaceError> {
        let failed = self
            .state
            .lock()
            .map(|s| s.conn == ConnStatus::Failed)
            .unwrap_or(true);
        if failed {
            return Err(SurfaceError::Unavailable("session bus unreachable".into()));
        }
        self.mutate(|s| {
            if s.content.as_ref().map(|c| c.track_id) != Some(content.track_id) {
                s.art_url = None;
            }
            s.content = Some(content.clone());
            s.pinned = true;
        });
        Ok(())
    }

    fn publish(&self, content: &StatusContent) {
        self.mutate(|s| {
            if s.content.as_ref().map(|c| c.track_id) != Some(content.track_id) {
                s.art_url = None;
            }
            s.content = Some(content.clone());
            s.pinned = false;
        });
    }

    fn set_artwork(&self, url: String) {
        self.mutate(|s| s.art_url = Some(url));
    }

    fn remove(&self) {
        self.mutate(|s| {
            s.content = None;
            s.pinned = false;
            s.art_url = None;
        });
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        let _ = self.tx.send(ControlCmd::OpenDetail);
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        self.state.lock().map(|s| !s.pinned).unwrap_or(true)
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "vivace"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        playback_status_str(&s)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let Ok(s) = self.state.lock() else {
            return HashMap::new();
        };
        build_metadata(&s)
    }
}

fn playback_status_str(s: &SharedState) -> &'static str {
    match &s.content {
        None => "Stopped",
        Some(c) if c.playing => "Playing",
        Some(_) => "Paused",
    }
}

fn insert_value(map: &mut HashMap<String, OwnedValue>, key: &str, value: Value<'_>) {
    if let Ok(owned) = OwnedValue::try_from(value) {
        map.insert(key.to_string(), owned);
    }
}

fn build_metadata(s: &SharedState) -> HashMap<String, OwnedValue> {
    let mut map = HashMap::new();
    let Some(content) = &s.content else {
        return map;
    };

    insert_value(&mut map, "xesam:title", Value::from(content.title.clone()));
    if let Some(artist) = &content.artist {
        insert_value(&mut map, "xesam:artist", Value::from(vec![artist.clone()]));
    }
    if let Some(id) = content.track_id
        && let Ok(path) = ObjectPath::try_from(format!("/org/vivace/track/{id}"))
    {
        insert_value(&mut map, "mpris:trackid", Value::from(path));
    }
    if let Some(duration_ms) = content.duration_ms {
        // MPRIS wants microseconds.
        insert_value(
            &mut map,
            "mpris:length",
            Value::from((duration_ms as i64).saturating_mul(1_000)),
        );
    }
    if let Some(url) = &s.art_url {
        insert_value(&mut map, "mpris:artUrl", Value::from(url.clone()));
    }
    map
}

/// Register the two MPRIS interfaces on the session bus and keep them in
/// sync with the shared state. Bus failures leave an inert handle whose
/// pins are rejected.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> Arc<MprisHandle> {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let dirty = Arc::new(AtomicBool::new(false));

    let handle = Arc::new(MprisHandle {
        state: state.clone(),
        dirty: dirty.clone(),
    });

    std::thread::spawn(move || {
        block_on(async move {
            let mark_failed = |state: &Arc<Mutex<SharedState>>| {
                if let Ok(mut s) = state.lock() {
                    s.conn = ConnStatus::Failed;
                }
            };

            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "failed to connect to session bus");
                    mark_failed(&state);
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!(error = %e, "failed to acquire bus name");
                mark_failed(&state);
                return;
            }

            let object_server = connection.object_server();

            let root = RootIface {
                tx: tx.clone(),
                state: state.clone(),
            };
            if let Err(e) = object_server.at(OBJECT_PATH, root).await {
                warn!(error = %e, "failed to register root interface");
                mark_failed(&state);
                return;
            }

            let player = PlayerIface {
                tx,
                state: state.clone(),
            };
            if let Err(e) = object_server.at(OBJECT_PATH, player).await {
                warn!(error = %e, "failed to register player interface");
                mark_failed(&state);
                return;
            }

            if let Ok(mut s) = state.lock() {
                s.conn = ConnStatus::Up;
            }

            let root_ref = object_server.interface::<_, RootIface>(OBJECT_PATH).await;
            let player_ref = object_server
                .interface::<_, PlayerIface>(OBJECT_PATH)
                .await;
            let (Ok(root_ref), Ok(player_ref)) = (root_ref, player_ref) else {
                return;
            };

            loop {
                Timer::after(Duration::from_millis(250)).await;
                if !dirty.swap(false, Ordering::SeqCst) {
                    continue;
                }
                let player = player_ref.get().await;
                let _ = player
                    .playback_status_changed(player_ref.signal_emitter())
                    .await;
                let _ = player.metadata_changed(player_ref.signal_emitter()).await;
                drop(player);
                let root = root_ref.get().await;
                let _ = root.can_quit_changed(root_ref.signal_emitter()).await;
            }
        });
    });

    handle
}

#[cfg(test)]
mod tests;

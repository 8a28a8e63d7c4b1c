use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use zvariant::OwnedValue;

use crate::presence::{StatusContent, StatusSurface};

use super::{
    ConnStatus, MprisHandle, SharedState, build_metadata, playback_status_str,
};

fn handle() -> MprisHandle {
    MprisHandle {
        state: Arc::new(Mutex::new(SharedState::default())),
        dirty: Arc::new(AtomicBool::new(false)),
    }
}

fn content(title: &str, playing: bool) -> StatusContent {
    StatusContent {
        title: title.to_string(),
        artist: Some("Artist".to_string()),
        track_id: Some(7),
        duration_ms: Some(180_000),
        playing,
    }
}

fn take_string(map: &mut HashMap<String, OwnedValue>, key: &str) -> String {
    String::try_from(map.remove(key).unwrap()).unwrap()
}

#[test]
fn playback_status_maps_content_to_mpris_strings() {
    let mut s = SharedState::default();
    assert_eq!(playback_status_str(&s), "Stopped");

    s.content = Some(content("Alpha", true));
    assert_eq!(playback_status_str(&s), "Playing");

    s.content = Some(content("Alpha", false));
    assert_eq!(playback_status_str(&s), "Paused");
}

#[test]
fn metadata_carries_title_artist_length_and_trackid() {
    let mut s = SharedState::default();
    s.content = Some(content("Alpha", true));
    s.art_url = Some("file:///tmp/cover.png".to_string());

    let mut map = build_metadata(&s);

    assert_eq!(take_string(&mut map, "xesam:title"), "Alpha");
    assert_eq!(
        i64::try_from(map.remove("mpris:length").unwrap()).unwrap(),
        180_000_000
    );
    assert_eq!(
        take_string(&mut map, "mpris:artUrl"),
        "file:///tmp/cover.png"
    );
    assert!(map.contains_key("xesam:artist"));
    assert!(map.contains_key("mpris:trackid"));
}

#[test]
fn metadata_is_empty_without_content() {
    assert!(build_metadata(&SharedState::default()).is_empty());
}

#[test]
fn pin_makes_the_surface_undismissable() {
    let h = handle();
    h.pin(&content("Alpha", true)).unwrap();

    let s = h.state.lock().unwrap();
    assert!(s.pinned);
    assert_eq!(s.content.as_ref().unwrap().title, "Alpha");
}

#[test]
fn publish_releases_the_pin() {
    let h = handle();
    h.pin(&content("Alpha", true)).unwrap();
    h.publish(&content("Alpha", false));

    assert!(!h.state.lock().unwrap().pinned);
}

#[test]
fn pin_fails_once_the_bus_is_gone() {
    let h = handle();
    h.state.lock().unwrap().conn = ConnStatus::Failed;

    assert!(h.pin(&content("Alpha", true)).is_err());
}

#[test]
fn artwork_is_dropped_when_the_track_changes() {
    let h = handle();
    h.publish(&content("Alpha", true));
    h.set_artwork("file:///tmp/alpha.png".to_string());

    // Same track keeps the artwork.
    h.publish(&content("Alpha", false));
    assert!(h.state.lock().unwrap().art_url.is_some());

    let mut other = content("Beta", true);
    other.track_id = Some(8);
    h.publish(&other);
    assert!(h.state.lock().unwrap().art_url.is_none());
}

#[test]
fn remove_clears_everything() {
    let h = handle();
    h.pin(&content("Alpha", true)).unwrap();
    h.set_artwork("file:///tmp/alpha.png".to_string());
    h.remove();

    let s = h.state.lock().unwrap();
    assert!(s.content.is_none());
    assert!(!s.pinned);
    assert!(s.art_url.is_none());
    assert_eq!(playback_status_str(&s), "Stopped");
}

use std::path::PathBuf;

use crate::controller::PlaybackState;
use crate::library::{LibraryUpdate, Track};

use super::{App, LibraryView};

fn track(id: u64, title: &str) -> Track {
    Track {
        id,
        path: PathBuf::from(format!("/music/{id}.mp3")),
        title: title.to_string(),
        artist: None,
        album: None,
        duration_ms: 120_000,
        artwork: None,
        display: title.to_string(),
    }
}

fn loaded(app: &mut App, ids: &[u64]) {
    let tracks = ids.iter().map(|&id| track(id, &format!("t{id}"))).collect();
    app.apply_library(LibraryUpdate::Loaded(tracks));
}

#[test]
fn starts_loading_with_no_tracks() {
    let app = App::new();
    assert_eq!(app.view, LibraryView::Loading);
    assert!(!app.has_tracks());
    assert!(app.selected_track().is_none());
}

#[test]
fn selection_wraps_both_ways() {
    let mut app = App::new();
    loaded(&mut app, &[1, 2, 3]);

    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    assert_eq!(app.selected, 1);
}

#[test]
fn selection_clamps_when_the_library_shrinks() {
    let mut app = App::new();
    loaded(&mut app, &[1, 2, 3]);
    app.selected = 2;

    loaded(&mut app, &[1]);
    assert_eq!(app.selected, 0);
}

#[test]
fn current_track_follows_the_playback_snapshot() {
    let mut app = App::new();
    loaded(&mut app, &[1, 2]);

    let snapshot = PlaybackState {
        current_track_id: Some(2),
        ..PlaybackState::default()
    };
    app.apply_playback(snapshot);

    assert_eq!(app.current_track().map(|t| t.id), Some(2));
}

#[test]
fn detail_opens_immediately_when_the_library_is_ready() {
    let mut app = App::new();
    loaded(&mut app, &[1, 2]);

    app.request_detail(Some(2));

    assert!(app.detail_open);
    assert_eq!(app.selected, 1);
}

#[test]
fn detail_requests_queue_while_loading_and_replay_in_order() {
    let mut app = App::new();

    app.request_detail(Some(1));
    app.request_detail(Some(3));
    assert!(!app.detail_open);

    loaded(&mut app, &[1, 2, 3]);

    // Both requests applied; the later one decides the selection.
    assert!(app.detail_open);
    assert_eq!(app.selected, 2);
}

#[test]
fn detail_request_for_an_unknown_track_still_opens() {
    let mut app = App::new();
    loaded(&mut app, &[1]);
    app.selected = 0;

    app.request_detail(Some(99));

    assert!(app.detail_open);
    assert_eq!(app.selected, 0);
}

#[test]
fn failed_library_keeps_pending_detail_queued() {
    let mut app = App::new();
    app.request_detail(None);

    app.apply_library(LibraryUpdate::Failed("no such directory".into()));
    assert!(!app.detail_open);

    loaded(&mut app, &[1]);
    assert!(app.detail_open);
}

use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use crate::config::LibrarySettings;

use super::feed::{LibraryFeed, LibraryUpdate};
use super::model::{make_display, track_id_for_path};
use super::scan::scan;

#[test]
fn make_display_prefers_artist_dash_title() {
    assert_eq!(make_display("Song", Some("Artist")), "Artist - Song");
    assert_eq!(make_display("Song", Some("  Artist  ")), "Artist - Song");
    assert_eq!(make_display("Song", None), "Song");
    assert_eq!(make_display("Song", Some("")), "Song");
    assert_eq!(make_display("Song", Some("   ")), "Song");
}

#[test]
fn track_ids_are_stable_and_distinct() {
    let a = track_id_for_path(Path::new("/music/a.mp3"));
    let b = track_id_for_path(Path::new("/music/b.mp3"));
    assert_eq!(a, track_id_for_path(Path::new("/music/a.mp3")));
    assert_ne!(a, b);
}

#[test]
fn scan_filters_non_audio_and_sorts_by_display_case_insensitive() {
    let dir = tempdir().unwrap();

    fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
    fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
    fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

    let tracks = scan(dir.path(), &LibrarySettings::default()).unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, "A");
    assert_eq!(tracks[1].title, "b");
}

#[test]
fn scan_reports_unreadable_root_as_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(scan(&missing, &LibrarySettings::default()).is_err());
}

#[test]
fn scan_respects_recursive_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("child.mp3"), b"not real").unwrap();

    let settings = LibrarySettings {
        recursive: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "root");
}

#[test]
fn scan_respects_include_hidden_false() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

    let settings = LibrarySettings {
        include_hidden: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "visible");
}

#[test]
fn scan_picks_up_sidecar_artwork() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("song.mp3"), b"not real").unwrap();
    fs::write(dir.path().join("cover.jpg"), b"not a real jpeg").unwrap();

    let tracks = scan(dir.path(), &LibrarySettings::default()).unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].artwork.as_deref(), Some(dir.path().join("cover.jpg").as_path()));
}

fn wait_for_loaded(rx: &std::sync::mpsc::Receiver<LibraryUpdate>) -> Vec<crate::library::Track> {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        match rx.recv_timeout(deadline - std::time::Instant::now()) {
            Ok(LibraryUpdate::Loaded(tracks)) => return tracks,
            Ok(_) => continue,
            Err(e) => panic!("no Loaded update: {e}"),
        }
    }
}

#[test]
fn feed_replays_latest_to_new_subscribers() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.mp3"), b"not real").unwrap();

    let feed = LibraryFeed::spawn(dir.path().to_path_buf(), LibrarySettings::default());
    let first = feed.subscribe();
    let tracks = wait_for_loaded(&first);
    assert_eq!(tracks.len(), 1);

    // A late subscriber sees the list immediately, without a rescan.
    let late = feed.subscribe();
    match late.recv_timeout(Duration::from_secs(1)).unwrap() {
        LibraryUpdate::Loaded(tracks) => assert_eq!(tracks.len(), 1),
        other => panic!("expected replayed Loaded, got {other:?}"),
    }
    feed.shutdown();
}

#[test]
fn feed_reports_failure_then_recovers_on_rescan() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("music");

    let feed = LibraryFeed::spawn(root.clone(), LibrarySettings::default());
    let rx = feed.subscribe();

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        match rx.recv_timeout(deadline - std::time::Instant::now()) {
            Ok(LibraryUpdate::Failed(_)) => break,
            Ok(_) => continue,
            Err(e) => panic!("no Failed update: {e}"),
        }
    }

    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("new.mp3"), b"not real").unwrap();
    feed.rescan();

    let tracks = wait_for_loaded(&rx);
    assert_eq!(tracks.len(), 1);
    feed.shutdown();
}

use std::path::{Path, PathBuf};

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::ItemKey;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Track, make_display, track_id_for_path};

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("library root {0:?} is not a readable directory")]
    RootUnreadable(PathBuf),
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            settings
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .any(|e| !e.is_empty() && e == ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Sidecar artwork next to the audio file: `cover.*` or `folder.*`.
fn sidecar_artwork(path: &Path) -> Option<PathBuf> {
    let dir = path.parent()?;
    for stem in ["cover", "folder"] {
        for ext in ["jpg", "jpeg", "png"] {
            let candidate = dir.join(format!("{stem}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Walk `dir` and collect tracks, sorted by display string.
///
/// Unreadable entries are skipped; only an unusable root is an error so the
/// UI can distinguish "failed to load" from "no music found".
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Result<Vec<Track>, LibraryError> {
    if !dir.is_dir() {
        return Err(LibraryError::RootUnreadable(dir.to_path_buf()));
    }

    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file()
            || (!settings.include_hidden && is_hidden(path))
            || !is_audio_file(path, settings)
        {
            continue;
        }

        let default_title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();

        let mut title = default_title;
        let mut artist: Option<String> = None;
        let mut album: Option<String> = None;
        let mut duration_ms: u64 = 0;
        let mut has_embedded_art = false;

        if let Ok(tagged) = lofty::read_from_path(path) {
            duration_ms = tagged.properties().duration().as_millis() as u64;

            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                    if !v.trim().is_empty() {
                        title = v.to_string();
                    }
                }
                if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                    let v = v.trim();
                    if !v.is_empty() {
                        artist = Some(v.to_string());
                    }
                }
                if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                    let v = v.trim();
                    if !v.is_empty() {
                        album = Some(v.to_string());
                    }
                }
                has_embedded_art = !tag.pictures().is_empty();
            }
        }

        let artwork = if has_embedded_art {
            Some(path.to_path_buf())
        } else {
            sidecar_artwork(path)
        };

        let display = make_display(&title, artist.as_deref());

        tracks.push(Track {
            id: track_id_for_path(path),
            path: path.to_path_buf(),
            title,
            artist,
            album,
            duration_ms,
            artwork,
            display,
        });
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    Ok(tracks)
}

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use lofty::file::TaggedFileExt;
use tracing::debug;

use crate::library::track_id_for_path;

/// Generation captured when an artwork fetch was issued. A completion whose
/// ticket no longer matches the loader's generation is stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtworkTicket(u64);

/// Asynchronous artwork resolution with a monotonic staleness guard.
///
/// The current track can change while a fetch is in flight; advancing the
/// generation on every transition guarantees late completions for a
/// superseded track never reach the surface.
pub struct ArtworkLoader {
    generation: AtomicU64,
    cache_dir: PathBuf,
}

impl ArtworkLoader {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            generation: AtomicU64::new(0),
            cache_dir,
        }
    }

    /// Invalidate everything issued so far.
    pub fn advance(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn begin(&self) -> ArtworkTicket {
        ArtworkTicket(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, ticket: ArtworkTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Resolve `source` off-thread and hand the result to `deliver`, unless
    /// the generation advanced in the meantime.
    pub fn fetch(
        self: &Arc<Self>,
        source: PathBuf,
        deliver: impl FnOnce(String) + Send + 'static,
    ) {
        self.fetch_with(self.begin(), source, deliver);
    }

    /// Like [`fetch`](Self::fetch), but resolves under a ticket issued
    /// earlier; a ticket from a superseded generation never delivers.
    pub fn fetch_with(
        self: &Arc<Self>,
        ticket: ArtworkTicket,
        source: PathBuf,
        deliver: impl FnOnce(String) + Send + 'static,
    ) {
        let loader = self.clone();
        thread::spawn(move || {
            let Some(url) = loader.resolve(&source) else {
                return;
            };
            if loader.is_current(ticket) {
                deliver(url);
            } else {
                debug!(source = %source.display(), "discarding stale artwork");
            }
        });
    }

    /// Turn an artwork source into a `file://` URL: images are used in
    /// place, audio files have their embedded picture extracted into the
    /// cache directory.
    fn resolve(&self, source: &Path) -> Option<String> {
        let is_image = source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png")
            });

        if is_image {
            return Some(file_url(source));
        }

        let tagged = lofty::read_from_path(source).ok()?;
        let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
        let picture = tag.pictures().first()?;

        fs::create_dir_all(&self.cache_dir).ok()?;
        let out = self
            .cache_dir
            .join(format!("{:016x}", track_id_for_path(source)));
        fs::write(&out, picture.data()).ok()?;
        Some(file_url(&out))
    }
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

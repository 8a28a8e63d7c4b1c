//! Track enumeration: scanning local audio files and observing changes.
//!
//! The rest of the player consumes the library through [`LibraryFeed`], a
//! push stream that replays the latest track list to each new subscriber
//! and re-emits on filesystem changes or an explicit rescan.

mod feed;
mod model;
mod scan;

pub use feed::{LibraryFeed, LibraryUpdate};
pub use model::{Track, TrackId, track_id_for_path};
pub use scan::{LibraryError, scan};

#[cfg(test)]
mod tests;

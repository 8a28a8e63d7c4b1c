//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model holds the latest library and playback snapshots plus the
//! pieces of view state (selection, detail overlay) the UI draws from.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;

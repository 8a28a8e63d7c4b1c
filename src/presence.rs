//! Foreground presence: keeping a status surface alive and undismissable
//! exactly while music is effectively playing.
//!
//! The [`PresenceManager`] owns the `{Detached, Pinned}` state machine and
//! only issues presence-level side effects through a [`StatusSurface`]; it
//! reads playback through the engine but never mutates the store.

mod artwork;
mod manager;
mod surface;

pub use artwork::{ArtworkLoader, ArtworkTicket};
pub use manager::{PresenceManager, PresenceSignal, PresenceState};
pub use surface::{StatusContent, StatusSurface, SurfaceError};

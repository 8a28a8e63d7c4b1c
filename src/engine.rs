//! The player engine boundary.
//!
//! Playback logic upstream of here (controller, presence) only ever sees
//! [`PlayerEngine`]: a narrow command/event/query contract. Commands never
//! block; effects surface later as [`EngineEvent`]s. The production
//! implementation is [`RodioEngine`]; tests drive a deterministic fake.

mod backend;
mod queue;
mod sink;
mod thread;
mod types;

pub use backend::RodioEngine;
pub use types::{
    EngineEvent, EngineState, EventSink, ItemMetadata, QueueItem, RepeatMode, TransitionReason,
};

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod tests;

use crate::library::TrackId;

pub trait PlayerEngine: Send + Sync {
    /// Replace the loaded queue and cue `start_index` at `start_position_ms`,
    /// paused. An empty `items` leaves the engine idle.
    fn load_queue(&self, items: Vec<QueueItem>, start_index: usize, start_position_ms: u64);
    fn play(&self);
    fn pause(&self);
    /// Ready the engine without starting playback; a no-op unless idle.
    fn prepare(&self);
    fn seek_to(&self, position_ms: u64);
    fn skip_next(&self);
    fn skip_previous(&self);
    fn set_repeat_mode(&self, mode: RepeatMode);
    fn set_shuffle_enabled(&self, enabled: bool);
    fn clear_queue(&self);
    fn stop(&self);

    fn position_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
    fn current_item_id(&self) -> Option<TrackId>;
    fn current_metadata(&self) -> Option<ItemMetadata>;
    fn item_count(&self) -> usize;
    fn state(&self) -> EngineState;
    fn is_playing(&self) -> bool;
    /// Transport intent: true between `play` and the next `pause`/`stop`,
    /// regardless of whether audio is currently audible.
    fn play_intent(&self) -> bool;
}

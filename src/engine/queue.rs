//! Play-order bookkeeping for the rodio backend.
//!
//! `order` is the sequence of item indices playback walks through; it is the
//! identity permutation unless shuffle is on. Auto-advance and manual skips
//! both move through it, wrapping at the ends.

use rand::seq::SliceRandom;

/// Build the play order for `len` items, shuffled or sequential.
pub(super) fn build_order(len: usize, shuffle: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if shuffle {
        order.shuffle(&mut rand::rng());
    }
    order
}

/// Position of `item` within `order`, defaulting to the front.
pub(super) fn order_position(order: &[usize], item: usize) -> usize {
    order.iter().position(|&i| i == item).unwrap_or(0)
}

/// Next slot in the play order, wrapping at the end.
pub(super) fn next_in_order(pos: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (pos + 1) % len }
}

/// Previous slot in the play order, wrapping at the front.
pub(super) fn previous_in_order(pos: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if pos == 0 {
        len - 1
    } else {
        pos - 1
    }
}

use super::queue::{build_order, next_in_order, order_position, previous_in_order};

#[test]
fn sequential_order_is_identity() {
    assert_eq!(build_order(4, false), vec![0, 1, 2, 3]);
    assert!(build_order(0, false).is_empty());
}

#[test]
fn shuffled_order_is_a_permutation() {
    let order = build_order(16, true);
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..16).collect::<Vec<_>>());
}

#[test]
fn order_stepping_wraps_both_ways() {
    assert_eq!(next_in_order(0, 3), 1);
    assert_eq!(next_in_order(2, 3), 0);
    assert_eq!(previous_in_order(1, 3), 0);
    assert_eq!(previous_in_order(0, 3), 2);
}

#[test]
fn order_position_defaults_to_front_for_unknown_items() {
    let order = vec![2, 0, 1];
    assert_eq!(order_position(&order, 1), 2);
    assert_eq!(order_position(&order, 9), 0);
}

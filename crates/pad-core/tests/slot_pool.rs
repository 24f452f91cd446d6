// crates/pad-core/tests/slot_pool.rs
use pad_core::{SlotLabel, SlotPool};

fn label(n: u32) -> SlotLabel {
    SlotLabel::new(n).unwrap()
}

#[test]
fn pool_hands_out_in_order_and_exhausts() {
    let mut pool = SlotPool::new(2);
    assert!(!pool.is_exhausted());
    assert_eq!(pool.acquire(), Some(label(1)));
    assert_eq!(pool.acquire(), Some(label(2)));
    assert!(pool.is_exhausted());
    assert_eq!(pool.acquire(), None);

    pool.release(label(1));
    assert!(!pool.is_exhausted());
    assert_eq!(pool.acquire(), Some(label(1)));
}

#[test]
fn releasing_unissued_or_free_label_is_ignored() {
    let mut pool = SlotPool::new(3);
    assert_eq!(pool.acquire(), Some(label(1)));

    // player3 was never handed out; player1 twice only frees it once.
    pool.release(label(3));
    pool.release(label(1));
    pool.release(label(1));

    assert_eq!(pool.acquire(), Some(label(1)));
    assert_eq!(pool.acquire(), Some(label(2)));
    assert_eq!(pool.acquire(), Some(label(3)));
    assert_eq!(pool.acquire(), None);
}

#[test]
fn pool_capacity_bounds_allocation() {
    let mut pool = SlotPool::new(u32::MAX);
    assert_eq!(pool.acquire(), Some(label(1)));
    assert_eq!(pool.capacity(), u32::MAX);

    let mut empty = SlotPool::new(0);
    assert!(empty.is_exhausted());
    assert_eq!(empty.acquire(), None);
}

//! Player-slot labels and the free-slot pool.
//!
//! Labels are drawn from the fixed set `player1..=playerN`. The pool
//! hands out labels in order and keeps only the released ones in an
//! ordered set, so allocation always picks the smallest free label, a
//! released label is reused by the next connection, and the cost of a
//! pool never depends on its capacity.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A player seat, `player1`, `player2`, ... (1-based).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotLabel(u32);

impl SlotLabel {
    /// Returns `None` for `0`; labels are 1-based.
    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(SlotLabel(n))
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player{}", self.0)
    }
}

impl FromStr for SlotLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .strip_prefix("player")
            .and_then(|digits| digits.parse::<u32>().ok())
            .ok_or(())?;
        SlotLabel::new(n).ok_or(())
    }
}

/// Free-set allocator over `player1..=player<capacity>`.
///
/// Every label below `next_fresh` has been handed out at least once and
/// is either bound or in `released`; every label from `next_fresh` to
/// `capacity` has never been used.
#[derive(Debug, Clone)]
pub struct SlotPool {
    capacity: u32,
    /// u64 so `capacity == u32::MAX` can be exhausted without overflow.
    next_fresh: u64,
    released: BTreeSet<SlotLabel>,
}

impl SlotPool {
    pub fn new(capacity: u32) -> Self {
        SlotPool {
            capacity,
            next_fresh: 1,
            released: BTreeSet::new(),
        }
    }

    /// Take the smallest unused label.
    pub fn acquire(&mut self) -> Option<SlotLabel> {
        // Released labels are all below `next_fresh`, so they win.
        if let Some(slot) = self.released.pop_first() {
            return Some(slot);
        }
        if self.next_fresh > u64::from(self.capacity) {
            return None;
        }
        let slot = SlotLabel(self.next_fresh as u32);
        self.next_fresh += 1;
        Some(slot)
    }

    /// Return a label to the pool. Labels never handed out, or already
    /// free, are ignored.
    pub fn release(&mut self, slot: SlotLabel) {
        if u64::from(slot.0) < self.next_fresh {
            self.released.insert(slot);
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn is_exhausted(&self) -> bool {
        self.released.is_empty() && self.next_fresh > u64::from(self.capacity)
    }
}

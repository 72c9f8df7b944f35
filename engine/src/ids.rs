//! Monotonic id allocation for records added without an id.
//!
//! The allocator only hands out integer ids. It observes every id that enters
//! the engine and keeps its counter strictly above the largest integer seen,
//! so a fresh id can never collide with a record that exists or has existed.

use crate::RecordId;
use serde::{Deserialize, Serialize};

/// A monotonically increasing id counter.
///
/// The counter saturates at `i64::MAX`. Once that id has been handed out or
/// observed, every later allocation returns `i64::MAX` again, which the
/// engine reports as a `DuplicateId`. Callers then have to supply their own
/// ids; the allocator never wraps around onto low ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdAllocator {
    /// The next id to hand out
    next: i64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// Create a new allocator, starting at 1.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Create an allocator whose next id is `next`.
    pub fn starting_at(next: i64) -> Self {
        Self { next }
    }

    /// The id that the next call to [`IdAllocator::allocate`] returns.
    pub fn peek(&self) -> i64 {
        self.next
    }

    /// Hand out a fresh id and advance the counter.
    pub fn allocate(&mut self) -> RecordId {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        RecordId::Number(id)
    }

    /// Advance past an id that entered the engine from outside.
    ///
    /// Text ids never collide with allocated ids and are ignored.
    pub fn observe(&mut self, id: &RecordId) {
        if let RecordId::Number(n) = id {
            if *n >= self.next {
                self.next = n.saturating_add(1);
            }
        }
    }

    /// Advance past another allocator's position.
    pub fn merge(&mut self, other: &IdAllocator) {
        self.next = self.next.max(other.next);
    }
}

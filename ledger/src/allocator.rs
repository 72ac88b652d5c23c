//! Monotonic id allocation.
//!
//! Each registry owns one allocator. Ids are handed out in strictly
//! increasing order and never reused; callers cannot choose an id.

use serde::{Deserialize, Serialize};

/// Issues strictly increasing integer identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator whose first id is `first`
    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// The id the next record will receive, or `None` once the id space is exhausted
    ///
    /// Peeking does not reserve the id; [`IdAllocator::commit`] does.
    #[must_use]
    pub const fn peek(&self) -> Option<u64> {
        if self.next == u64::MAX {
            None
        } else {
            Some(self.next)
        }
    }

    /// Marks `id` as used, so every later id is greater
    ///
    /// Committing an id below the current position is a no-op.
    pub const fn commit(&mut self, id: u64) {
        if id >= self.next {
            self.next = id.saturating_add(1);
        }
    }

    /// The raw next position, including the exhausted sentinel
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.next
    }
}

//! Request ID Allocator
//!
//! Per-server counter handing out correlation ids in `0..=MAX_REQUEST_ID`.
//!
//! The counter itself is not synchronized; it lives inside a server's
//! [`ServerTable`](crate::reassembly::ServerTable) state and is advanced
//! under that table's lock, together with the collision check against the
//! pending slots.

/// Largest id handed out before the counter wraps to 0
pub const MAX_REQUEST_ID: u16 = 60000;

/// Monotonic id counter with wraparound
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u16,
}

impl IdAllocator {
    /// Create a counter starting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter starting at `start` (clamped to the valid range)
    pub fn starting_at(start: u16) -> Self {
        Self {
            next: start.min(MAX_REQUEST_ID),
        }
    }

    /// Return the current id and move the counter forward
    pub fn advance(&mut self) -> u16 {
        let id = self.next;
        self.next = if id < MAX_REQUEST_ID { id + 1 } else { 0 };
        id
    }

    /// The id the next `advance` will return
    pub fn peek(&self) -> u16 {
        self.next
    }
}

//! Server table
//!
//! The id counter and pending slots of one server, behind one lock.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};

use crate::allocator::IdAllocator;
use crate::error::{MemcachedError, Result};
use crate::protocol::UdpHeader;
use super::{Accepted, PacketBuffer};

/// Outcome of routing one reply datagram into a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Stored, reply still incomplete
    Partial,

    /// Reply complete, waiter notified
    Complete,

    /// Packet already seen, or slot already complete
    Duplicate,

    /// No pending slot for the request id (never sent, or already consumed)
    Unknown,

    /// Header inconsistent with the slot or out of range
    Malformed,
}

/// State of one pending request
#[derive(Debug)]
enum Slot {
    Awaiting(PacketBuffer),
    Ready(Bytes),
}

#[derive(Debug, Default)]
struct TableState {
    allocator: IdAllocator,
    slots: HashMap<u16, Slot>,
}

/// Per-server request table
///
/// ## Concurrency:
/// - `state`: one mutex serializes allocation (callers), delivery (receiver)
///   and removal (callers) for this server only
/// - `arrived`: signalled on every completed reply; waiters re-check their
///   own slot
pub struct ServerTable {
    server: SocketAddr,
    state: Mutex<TableState>,
    arrived: Condvar,
}

impl ServerTable {
    /// Create an empty table for `server`
    pub fn new(server: SocketAddr) -> Self {
        Self::with_allocator(server, IdAllocator::new())
    }

    /// Create a table whose counter starts from an existing allocator
    pub fn with_allocator(server: SocketAddr, allocator: IdAllocator) -> Self {
        Self {
            server,
            state: Mutex::new(TableState {
                allocator,
                slots: HashMap::new(),
            }),
            arrived: Condvar::new(),
        }
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Reserve the next request id and open an awaiting slot for it.
    ///
    /// Fails with `AllocationCollision` if the counter has wrapped into a
    /// request that is still outstanding. The counter advances either way.
    pub fn allocate(&self) -> Result<u16> {
        let mut state = self.state.lock();
        let request_id = state.allocator.advance();

        if state.slots.contains_key(&request_id) {
            tracing::error!(
                "Request id collision for server {}: id {} is still pending ({} outstanding)",
                self.server,
                request_id,
                state.slots.len()
            );
            return Err(MemcachedError::AllocationCollision {
                server: self.server,
                request_id,
            });
        }

        state
            .slots
            .insert(request_id, Slot::Awaiting(PacketBuffer::new()));
        Ok(request_id)
    }

    /// Route one reply datagram into its slot
    pub fn deliver(&self, header: &UdpHeader, payload: &[u8]) -> Delivery {
        let mut state = self.state.lock();

        let buffer = match state.slots.get_mut(&header.request_id) {
            None => return Delivery::Unknown,
            Some(Slot::Ready(_)) => return Delivery::Duplicate,
            Some(Slot::Awaiting(buffer)) => buffer,
        };

        match buffer.accept(header.sequence, header.total_packets, payload) {
            Accepted::Partial => Delivery::Partial,
            Accepted::Duplicate => Delivery::Duplicate,
            Accepted::Rejected => Delivery::Malformed,
            Accepted::Complete => {
                let Some(reply) = buffer.assemble() else {
                    return Delivery::Partial;
                };
                state.slots.insert(header.request_id, Slot::Ready(reply));
                drop(state);

                self.arrived.notify_all();
                Delivery::Complete
            }
        }
    }

    /// Block until the reply for `request_id` is complete or `deadline`
    /// passes. The slot is removed in both cases.
    pub fn wait(&self, request_id: u16, deadline: Instant) -> Result<Bytes> {
        let mut state = self.state.lock();

        loop {
            let ready = match state.slots.get(&request_id) {
                Some(Slot::Ready(_)) => true,
                Some(Slot::Awaiting(_)) => false,
                None => {
                    return Err(MemcachedError::Protocol(format!(
                        "No pending slot for request id {} on {}",
                        request_id, self.server
                    )));
                }
            };
            if ready {
                if let Some(Slot::Ready(reply)) = state.slots.remove(&request_id) {
                    return Ok(reply);
                }
            }

            if Instant::now() >= deadline {
                state.slots.remove(&request_id);
                tracing::debug!(
                    "Request {} to {} timed out; slot released",
                    request_id,
                    self.server
                );
                return Err(MemcachedError::ServerNotResponding {
                    server: self.server,
                });
            }

            // Spurious and foreign wake-ups just loop back to the checks
            self.arrived.wait_until(&mut state, deadline);
        }
    }

    /// Drop the slot for `request_id` without waiting (e.g. the send failed)
    pub fn release(&self, request_id: u16) -> bool {
        self.state.lock().slots.remove(&request_id).is_some()
    }

    /// Number of outstanding slots
    pub fn pending(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// The id the next allocation will try
    pub fn next_request_id(&self) -> u16 {
        self.state.lock().allocator.peek()
    }
}

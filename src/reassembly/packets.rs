//! Packet buffer
//!
//! Collects the datagrams of one reply, indexed by sequence number.

use bytes::{Bytes, BytesMut};

/// Outcome of offering one datagram to a [`PacketBuffer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    /// Stored; more packets are expected
    Partial,

    /// Stored; every packet is now present
    Complete,

    /// Same sequence number seen before; ignored
    Duplicate,

    /// Inconsistent with the header of earlier packets, or out of range
    Rejected,
}

/// Sequence-aware accumulator for a multi-datagram reply
///
/// The first packet fixes the expected total. Payloads are assembled in
/// sequence order, not arrival order.
#[derive(Debug, Default)]
pub struct PacketBuffer {
    chunks: Vec<Option<Bytes>>,
    received: usize,
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer one datagram's payload
    pub fn accept(&mut self, sequence: i16, total_packets: i16, payload: &[u8]) -> Accepted {
        if total_packets <= 0 || sequence < 0 || sequence >= total_packets {
            return Accepted::Rejected;
        }
        let total = total_packets as usize;
        let index = sequence as usize;

        if self.chunks.is_empty() {
            self.chunks = vec![None; total];
        } else if self.chunks.len() != total {
            return Accepted::Rejected;
        }

        if self.chunks[index].is_some() {
            return Accepted::Duplicate;
        }
        self.chunks[index] = Some(Bytes::copy_from_slice(payload));
        self.received += 1;

        if self.is_complete() {
            Accepted::Complete
        } else {
            Accepted::Partial
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.chunks.is_empty() && self.received == self.chunks.len()
    }

    /// Packets received so far
    pub fn received(&self) -> usize {
        self.received
    }

    /// Expected packet count, once known
    pub fn expected(&self) -> Option<usize> {
        if self.chunks.is_empty() {
            None
        } else {
            Some(self.chunks.len())
        }
    }

    /// Concatenate all payloads in sequence order.
    /// Returns `None` until the buffer is complete.
    pub fn assemble(&self) -> Option<Bytes> {
        if !self.is_complete() {
            return None;
        }
        if self.chunks.len() == 1 {
            return self.chunks[0].clone();
        }

        let size = self.chunks.iter().flatten().map(Bytes::len).sum();
        let mut out = BytesMut::with_capacity(size);
        for chunk in self.chunks.iter().flatten() {
            out.extend_from_slice(chunk);
        }
        Some(out.freeze())
    }
}

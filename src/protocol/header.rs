//! UDP frame header
//!
//! The fixed 8-byte header memcached prepends to every UDP datagram.

use crate::error::{MemcachedError, Result};

/// Header size: request id (2) + sequence (2) + total (2) + reserved (2)
pub const HEADER_SIZE: usize = 8;

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    /// Correlation id chosen by the client and echoed by the server
    pub request_id: u16,

    /// Zero-based index of this datagram within the reply
    pub sequence: i16,

    /// Number of datagrams making up the reply
    pub total_packets: i16,

    /// Reserved, sent as 0
    pub reserved: i16,
}

impl UdpHeader {
    pub fn new(request_id: u16, sequence: i16, total_packets: i16, reserved: i16) -> Self {
        Self {
            request_id,
            sequence,
            total_packets,
            reserved,
        }
    }

    /// Header for a single-datagram request
    pub fn request(request_id: u16) -> Self {
        Self::new(request_id, 0, 1, 0)
    }

    /// Encode to the big-endian wire form
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..2].copy_from_slice(&self.request_id.to_be_bytes());
        out[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        out[4..6].copy_from_slice(&self.total_packets.to_be_bytes());
        out[6..8].copy_from_slice(&self.reserved.to_be_bytes());
        out
    }

    /// Decode from the first 8 bytes of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(MemcachedError::Protocol(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        Ok(Self {
            request_id: u16::from_be_bytes([bytes[0], bytes[1]]),
            sequence: i16::from_be_bytes([bytes[2], bytes[3]]),
            total_packets: i16::from_be_bytes([bytes[4], bytes[5]]),
            reserved: i16::from_be_bytes([bytes[6], bytes[7]]),
        })
    }
}

/// Encode header fields without building a `UdpHeader` first
pub fn encode_header(request_id: u16, sequence: i16, total_packets: i16, reserved: i16) -> [u8; HEADER_SIZE] {
    UdpHeader::new(request_id, sequence, total_packets, reserved).encode()
}

/// Decode header fields as `(request_id, sequence, total_packets, reserved)`
pub fn decode_header(bytes: &[u8]) -> Result<(u16, i16, i16, i16)> {
    let header = UdpHeader::decode(bytes)?;
    Ok((
        header.request_id,
        header.sequence,
        header.total_packets,
        header.reserved,
    ))
}

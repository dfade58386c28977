//! Protocol codec
//!
//! Framing of outbound requests and splitting of inbound datagrams.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::Result;
use super::{Command, UdpHeader, HEADER_SIZE};

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command as memcached text
///
/// - SET: `set <key> 0 0 <len>\r\n<value>\r\n` (flags and exptime are 0)
/// - GET: `get <key>\r\n`
pub fn encode_command(command: &Command) -> Vec<u8> {
    match command {
        Command::Set { key, value } => {
            let mut out = Vec::with_capacity(key.len() + value.len() + 32);
            out.extend_from_slice(b"set ");
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(b" 0 0 ");
            out.extend_from_slice(value.len().to_string().as_bytes());
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
            out
        }
        Command::Get { key } => {
            let mut out = Vec::with_capacity(key.len() + 6);
            out.extend_from_slice(b"get ");
            out.extend_from_slice(key.as_bytes());
            out.extend_from_slice(b"\r\n");
            out
        }
    }
}

// =============================================================================
// Datagram Framing
// =============================================================================

/// Build a complete request datagram: header (seq 0 of 1) + command text
pub fn encode_request(request_id: u16, command: &Command) -> Bytes {
    let text = encode_command(command);

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + text.len());
    frame.put_slice(&UdpHeader::request(request_id).encode());
    frame.put_slice(&text);
    frame.freeze()
}

/// Split a received datagram into its header and payload
pub fn split_datagram(datagram: &[u8]) -> Result<(UdpHeader, &[u8])> {
    let header = UdpHeader::decode(datagram)?;
    Ok((header, &datagram[HEADER_SIZE..]))
}

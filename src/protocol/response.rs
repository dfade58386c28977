//! Reply decoding
//!
//! Interprets the text a server sent back, once all of its datagrams have
//! been reassembled.

use crate::error::{MemcachedError, Result};

const CRLF: &[u8] = b"\r\n";

/// Split on CRLF the way `str::split` would, keeping a trailing empty piece
fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 1 < bytes.len() {
        if &bytes[i..i + 2] == CRLF {
            lines.push(&bytes[start..i]);
            i += 2;
            start = i;
        } else {
            i += 1;
        }
    }
    lines.push(&bytes[start..]);
    lines
}

/// First CRLF-terminated line of a reply (the whole reply if no CRLF)
pub fn first_line(reply: &[u8]) -> &[u8] {
    reply
        .windows(CRLF.len())
        .position(|w| w == CRLF)
        .map(|end| &reply[..end])
        .unwrap_or(reply)
}

/// The `<bytes>` field of a `VALUE <key> <flags> <bytes> [<cas>]` line
fn declared_length(header_line: &[u8]) -> Result<usize> {
    let line = std::str::from_utf8(header_line)
        .map_err(|_| MemcachedError::Protocol("VALUE line is not valid UTF-8".to_string()))?;

    line.split(' ')
        .nth(3)
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| MemcachedError::Protocol(format!("Malformed VALUE line: {:?}", line)))
}

/// Whether a store succeeded: the first line must be exactly `STORED`
pub fn decode_set_reply(reply: &[u8]) -> bool {
    first_line(reply) == b"STORED"
}

/// Extract the value from a fetch reply.
///
/// `VALUE <key> <flags> <bytes>\r\n<data>\r\nEND\r\n` yields the lines
/// between the header line and the last two lines (`END` and the empty
/// piece after the final CRLF), rejoined with CRLF, so values that
/// themselves contain CRLF survive. The result must match the declared
/// `<bytes>` length. Any other reply means the key is absent.
pub fn decode_get_reply(reply: &[u8]) -> Result<Option<String>> {
    if !reply.starts_with(b"VALUE") {
        return Ok(None);
    }

    let lines = split_lines(reply);
    if lines.len() < 3 {
        return Err(MemcachedError::Protocol(format!(
            "Truncated VALUE reply: {} line(s)",
            lines.len()
        )));
    }

    let value = lines[1..lines.len() - 2].join(CRLF);

    let declared = declared_length(lines[0])?;
    if value.len() != declared {
        return Err(MemcachedError::Protocol(format!(
            "VALUE reply declares {} bytes but carries {}",
            declared,
            value.len()
        )));
    }

    String::from_utf8(value)
        .map(Some)
        .map_err(|e| MemcachedError::Protocol(format!("Value is not valid UTF-8: {}", e)))
}

//! Protocol Module
//!
//! Wire protocol for memcached over UDP.
//!
//! ## Frame Format
//! Every datagram, in either direction, is an 8-byte frame header followed
//! by a fragment of the ASCII text protocol.
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────┬──────────────┐
//! │ Request (2)  │ Sequence (2) │ Total (2)    │ Reserved (2) │  Text ...    │
//! └──────────────┴──────────────┴──────────────┴──────────────┴──────────────┘
//! ```
//! All header fields are big-endian.
//!
//! ### Commands
//! - `set <key> 0 0 <bytes>\r\n<value>\r\n` → `STORED\r\n` on success
//! - `get <key>\r\n` → `VALUE <key> <flags> <bytes>\r\n<value>\r\nEND\r\n`,
//!   or `END\r\n` when the key is absent
//!
//! Requests always fit a single datagram. Replies may span several; the
//! receiver stitches them together by sequence number.

mod header;
mod command;
mod response;
mod codec;

pub use header::{decode_header, encode_header, UdpHeader, HEADER_SIZE};
pub use command::{validate_key, Command, CommandType, MAX_KEY_LENGTH};
pub use response::{decode_get_reply, decode_set_reply, first_line};
pub use codec::{encode_command, encode_request, split_datagram};

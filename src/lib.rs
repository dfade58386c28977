//! # memcached-udp
//!
//! A memcached client speaking the UDP protocol:
//! - `set`/`get` against a pool of independent servers
//! - Key partitioning by a pluggable hash (CRC32 by default)
//! - Request correlation with per-server request ids
//! - Reassembly of replies spanning several datagrams
//! - Bounded blocking waits; no retries, no replication
//!
//! ## Architecture Overview
//!
//! ```text
//!   caller threads (set / get)                 receiver thread
//! ┌─────────────────────────────┐        ┌─────────────────────────┐
//! │ ServerSelector::pick        │        │ recv_from (timeout)     │
//! │ ServerTable::allocate ──────┼──┐     │ split_datagram          │
//! │ encode_request + send_to ───┼──┼──►  │ dispatch by source addr │
//! │ ServerTable::wait  ◄────────┼──┤     └────────────┬────────────┘
//! │ decode_*_reply              │  │                  │
//! └─────────────────────────────┘  │     ┌────────────▼────────────┐
//!                                  └────►│ ServerTable (per server)│
//!                                        │ Mutex<ids + slots>      │
//!                                        │ Condvar on completion   │
//!                                        └─────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use memcached_udp::{Client, Config};
//!
//! let config = Config::builder().server("127.0.0.1:11211").build()?;
//! let client = Client::new(config)?;
//!
//! client.set("key1", "value-123456")?;
//! assert_eq!(client.get("key1")?.as_deref(), Some("value-123456"));
//! assert_eq!(client.get("not-found")?, None);
//! # Ok::<(), memcached_udp::MemcachedError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod selector;
pub mod allocator;
pub mod reassembly;
pub mod receiver;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MemcachedError, Result};
pub use config::{Config, UnknownReplyPolicy};
pub use client::Client;
pub use selector::{Crc32Hasher, KeyHasher};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of memcached-udp
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

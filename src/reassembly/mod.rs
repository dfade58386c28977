//! Reassembly Module
//!
//! Per-server bookkeeping of in-flight requests.
//!
//! ## Responsibilities
//! - Hand out request ids (with collision detection against pending slots)
//! - Accumulate reply datagrams by sequence number until complete
//! - Wake the waiting caller when its reply is complete
//! - Drop replies nobody is waiting for
//!
//! ## Slot Lifecycle
//! ```text
//!   allocate ──► Awaiting ──(last packet)──► Ready ──(wait)──► removed
//!                   │
//!                   └──────(deadline)──────────────(wait)──► removed
//! ```
//! Ids are never reused while their slot exists; a late reply for a removed
//! slot is an unknown id and is dropped.

mod packets;
mod table;

pub use packets::{Accepted, PacketBuffer};
pub use table::{Delivery, ServerTable};

//! Receiver Loop
//!
//! The single background thread that reads every reply datagram off the
//! client socket and routes it to the table of the server it came from.
//!
//! ## Behaviour
//! - Sole reader of the socket; callers only send
//! - Receive timeouts are not errors, they just let the loop check the
//!   shutdown flag
//! - Nothing here reaches a caller: bad, stray and late datagrams are
//!   dropped and logged

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::{Config, UnknownReplyPolicy};
use crate::protocol::split_datagram;
use crate::reassembly::{Delivery, ServerTable};

/// Server tables keyed by the address replies arrive from
pub type TableMap = HashMap<SocketAddr, ServerTable>;

/// Thread name of the receiver
pub const RECEIVER_THREAD_NAME: &str = "memcached-udp-receiver";

/// Background reader of the client socket
pub struct Receiver {
    /// Clone of the client socket (read half by convention)
    socket: UdpSocket,

    /// Shared with the client
    tables: Arc<TableMap>,

    /// Set by the client when it is dropped
    shutdown: Arc<AtomicBool>,

    buffer_size: usize,
    policy: UnknownReplyPolicy,
    debug: bool,
}

impl Receiver {
    /// Prepare a receiver; applies the configured receive timeout to the socket
    pub fn new(
        socket: UdpSocket,
        tables: Arc<TableMap>,
        shutdown: Arc<AtomicBool>,
        config: &Config,
    ) -> io::Result<Self> {
        socket.set_read_timeout(Some(config.receive_timeout))?;

        Ok(Self {
            socket,
            tables,
            shutdown,
            buffer_size: config.receive_buffer_size,
            policy: config.unknown_reply_policy,
            debug: config.debug,
        })
    }

    /// Start the loop on its own named thread
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(RECEIVER_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    /// Receive and dispatch until the shutdown flag is set
    pub fn run(self) {
        // One spare byte tells a datagram that filled the buffer from one
        // that was cut short by it
        let mut buf = vec![0u8; self.buffer_size + 1];
        tracing::debug!(
            "Receiver started on {:?}",
            self.socket.local_addr().ok()
        );

        while !self.shutdown.load(Ordering::Acquire) {
            let (len, from) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(ref e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // ICMP port-unreachable surfaces here as a reset on some platforms
                    tracing::debug!("Receive error (ignored): {}", e);
                    continue;
                }
            };

            if len > self.buffer_size {
                tracing::warn!(
                    "Dropping datagram from {}: larger than the {}-byte receive buffer",
                    from,
                    self.buffer_size
                );
                continue;
            }

            dispatch(&self.tables, from, &buf[..len], self.policy, self.debug);
        }

        tracing::debug!("Receiver stopped");
    }
}

/// Route one datagram to the table of its source server
pub fn dispatch(
    tables: &TableMap,
    from: SocketAddr,
    datagram: &[u8],
    policy: UnknownReplyPolicy,
    debug: bool,
) -> Delivery {
    let Some(table) = tables.get(&from) else {
        tracing::debug!("Dropping datagram from unconfigured source {}", from);
        return Delivery::Unknown;
    };

    let (header, payload) = match split_datagram(datagram) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!("Dropping datagram from {}: {}", from, e);
            return Delivery::Malformed;
        }
    };

    if debug {
        tracing::debug!(
            server = %from,
            id = header.request_id,
            packet_number = header.sequence,
            total_packets = header.total_packets,
            misc = header.reserved,
            bytes = payload.len(),
            "Reply datagram"
        );
    }

    let delivery = table.deliver(&header, payload);
    match delivery {
        Delivery::Unknown => match policy {
            UnknownReplyPolicy::Warn => tracing::warn!(
                "Request id not found in results - ignoring... [server={}, request_id={}]",
                from,
                header.request_id
            ),
            UnknownReplyPolicy::Ignore => tracing::trace!(
                "Ignoring reply for unknown request id {} from {}",
                header.request_id,
                from
            ),
        },
        Delivery::Malformed => tracing::debug!(
            "Dropping inconsistent packet {}/{} for request {} from {}",
            header.sequence,
            header.total_packets,
            header.request_id,
            from
        ),
        Delivery::Duplicate | Delivery::Partial | Delivery::Complete => {}
    }
    delivery
}

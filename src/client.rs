//! Client Module
//!
//! The public `set`/`get` API and the request/response orchestration.
//!
//! ## Request Path
//! 1. Validate the key and pick its server
//! 2. Allocate a request id (opens the pending slot)
//! 3. Send the framed datagram
//! 4. Block on the server table until the reply is complete or the
//!    response timeout passes (the slot is removed either way)
//! 5. Decode the reply for the command type

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{MemcachedError, Result};
use crate::protocol::{
    decode_get_reply, decode_set_reply, encode_request, first_line, validate_key, Command,
};
use crate::reassembly::ServerTable;
use crate::receiver::{Receiver, TableMap};
use crate::selector::{Crc32Hasher, KeyHasher, ServerSelector};

/// A memcached UDP client
///
/// ## Concurrency Model
/// - One socket per client; callers send on it concurrently
/// - One background receiver thread reads it
/// - Each server has its own table lock; servers never contend
///
/// `Client` is `Send + Sync`; wrap it in an `Arc` to share across threads.
pub struct Client<H: KeyHasher = Crc32Hasher> {
    config: Config,
    socket: UdpSocket,
    selector: ServerSelector<H>,
    tables: Arc<TableMap>,
    shutdown: Arc<AtomicBool>,
    receiver: Option<JoinHandle<()>>,
}

impl Client<Crc32Hasher> {
    /// Create a client using CRC32 key partitioning
    pub fn new(config: Config) -> Result<Self> {
        Self::with_hasher(config, Crc32Hasher)
    }
}

impl<H: KeyHasher> Client<H> {
    /// Create a client with a custom key hasher
    ///
    /// Binds the socket and starts the receiver thread, which runs until
    /// the client is closed or dropped.
    pub fn with_hasher(config: Config, hasher: H) -> Result<Self> {
        config.validate()?;

        let selector = ServerSelector::new(config.servers.clone(), hasher)
            .ok_or_else(|| MemcachedError::Config("at least one server is required".to_string()))?;

        let tables: TableMap = config
            .servers
            .iter()
            .map(|server| (*server, ServerTable::new(*server)))
            .collect();
        let tables = Arc::new(tables);

        let socket = UdpSocket::bind(config.local_addr())?;
        let shutdown = Arc::new(AtomicBool::new(false));

        let receiver = Receiver::new(
            socket.try_clone()?,
            Arc::clone(&tables),
            Arc::clone(&shutdown),
            &config,
        )?;
        let receiver = receiver.spawn()?;

        tracing::debug!(
            "Client bound to {} for {} server(s)",
            socket.local_addr()?,
            config.servers.len()
        );

        Ok(Self {
            config,
            socket,
            selector,
            tables,
            shutdown,
            receiver: Some(receiver),
        })
    }

    // =========================================================================
    // Public Operations
    // =========================================================================

    /// Store `value` under `key`
    ///
    /// Fails with `Store` if the server does not answer `STORED`, and with
    /// `ServerNotResponding` if no reply arrives in time.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let command = Command::Set {
            key: key.to_string(),
            value: value.to_string(),
        };
        let (server, reply) = self.execute(&command)?;

        if decode_set_reply(&reply) {
            Ok(())
        } else {
            Err(MemcachedError::Store {
                key: key.to_string(),
                server,
                reply: String::from_utf8_lossy(first_line(&reply)).into_owned(),
            })
        }
    }

    /// Fetch the value stored under `key`; `None` if absent
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let command = Command::Get {
            key: key.to_string(),
        };
        let (_, reply) = self.execute(&command)?;
        decode_get_reply(&reply)
    }

    // =========================================================================
    // Orchestration
    // =========================================================================

    /// Send one command and wait for its complete reply
    fn execute(&self, command: &Command) -> Result<(SocketAddr, Bytes)> {
        let started = Instant::now();
        validate_key(command.key())?;

        let server = self.selector.pick(command.key());
        let table = self.table(server)?;

        let request_id = table.allocate()?;
        let frame = encode_request(request_id, command);

        tracing::trace!(
            "Sending {:?} request {} to {} ({} bytes)",
            command.command_type(),
            request_id,
            server,
            frame.len()
        );

        if let Err(e) = self.socket.send_to(&frame, server) {
            table.release(request_id);
            return Err(e.into());
        }

        let reply = table.wait(request_id, started + self.config.response_timeout)?;
        Ok((server, reply))
    }

    fn table(&self, server: SocketAddr) -> Result<&ServerTable> {
        self.tables.get(&server).ok_or_else(|| {
            MemcachedError::Config(format!("no request table for server {}", server))
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Configured server endpoints
    pub fn servers(&self) -> &[SocketAddr] {
        self.selector.servers()
    }

    /// Server responsible for `key`
    pub fn pick_server(&self, key: &str) -> SocketAddr {
        self.selector.pick(key)
    }

    /// Outstanding requests to `server` (0 for unknown servers)
    pub fn pending(&self, server: SocketAddr) -> usize {
        self.tables.get(&server).map(ServerTable::pending).unwrap_or(0)
    }

    /// Local address of the client socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stop the receiver and wait for its thread to exit
    ///
    /// Blocks for at most about one receive timeout. Dropping the client
    /// stops the receiver too, without waiting.
    pub fn close(mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::Release);

        if let Some(receiver) = self.receiver.take() {
            receiver.join().map_err(|_| {
                MemcachedError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "receiver thread panicked",
                ))
            })?;
        }
        Ok(())
    }

    /// Whether the receiver thread is still running
    pub fn is_receiver_running(&self) -> bool {
        self.receiver
            .as_ref()
            .map(|receiver| !receiver.is_finished())
            .unwrap_or(false)
    }
}

impl<H: KeyHasher> Drop for Client<H> {
    fn drop(&mut self) {
        // The receiver notices at its next wake-up (bounded by the receive timeout)
        self.shutdown.store(true, Ordering::Release);
    }
}

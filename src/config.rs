//! Configuration for memcached-udp
//!
//! Centralized client configuration with sensible defaults.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use crate::error::{MemcachedError, Result};
use crate::protocol::HEADER_SIZE;

/// What the receiver does with a reply whose request id has no pending slot.
///
/// Such replies are always dropped; the policy only picks how loudly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownReplyPolicy {
    /// Drop silently (trace-level diagnostics only)
    #[default]
    Ignore,

    /// Drop and log a warning
    Warn,
}

/// Main configuration for a memcached-udp client
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// Server endpoints; keys are partitioned across them by hash
    pub servers: Vec<SocketAddr>,

    /// Local address the client socket binds to.
    /// `None` binds the unspecified address of the servers' family.
    /// One socket serves every server, so all must share its family.
    pub bind_addr: Option<SocketAddr>,

    // -------------------------------------------------------------------------
    // Timing Configuration
    // -------------------------------------------------------------------------
    /// How long `set`/`get` wait for a reply
    pub response_timeout: Duration,

    /// Receive timeout of the background receiver's socket
    pub receive_timeout: Duration,

    // -------------------------------------------------------------------------
    // Receiver Configuration
    // -------------------------------------------------------------------------
    /// Size of the receive buffer for one datagram (bytes)
    pub receive_buffer_size: usize,

    /// Emit per-datagram diagnostics from the receiver
    pub debug: bool,

    /// Diagnostic level for replies with an unknown request id
    pub unknown_reply_policy: UnknownReplyPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            bind_addr: None,
            response_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(5),
            receive_buffer_size: 4096,
            debug: false,
            unknown_reply_policy: UnknownReplyPolicy::Ignore,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(MemcachedError::Config(
                "at least one server is required".to_string(),
            ));
        }
        if self.response_timeout.is_zero() {
            return Err(MemcachedError::Config(
                "response timeout must be greater than zero".to_string(),
            ));
        }
        // A zero read timeout means "block forever" to the socket layer
        if self.receive_timeout.is_zero() {
            return Err(MemcachedError::Config(
                "receive timeout must be greater than zero".to_string(),
            ));
        }
        if self.receive_buffer_size <= HEADER_SIZE {
            return Err(MemcachedError::Config(format!(
                "receive buffer must be larger than the {}-byte header (got {})",
                HEADER_SIZE, self.receive_buffer_size
            )));
        }

        let family = self.servers[0].is_ipv4();
        if let Some(other) = self.servers.iter().find(|s| s.is_ipv4() != family) {
            return Err(MemcachedError::Config(format!(
                "servers {} and {} use different address families; one socket cannot reach both",
                self.servers[0], other
            )));
        }
        if let Some(bind) = self.bind_addr {
            if bind.is_ipv4() != family {
                return Err(MemcachedError::Config(format!(
                    "bind address {} cannot reach server {}",
                    bind, self.servers[0]
                )));
            }
        }
        Ok(())
    }

    /// Local address to bind the client socket to
    pub fn local_addr(&self) -> SocketAddr {
        if let Some(addr) = self.bind_addr {
            return addr;
        }
        match self.servers.first() {
            Some(SocketAddr::V6(_)) => SocketAddr::from(([0u16; 8], 0)),
            _ => SocketAddr::from(([0u8; 4], 0)),
        }
    }
}

/// A server as given to the builder
enum ServerEntry {
    Resolved(SocketAddr),
    Unresolved(String),
}

/// Builder for Config
///
/// Servers keep the order they were added in, whichever method added them;
/// `host:port` strings are resolved in `build()`.
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
    servers: Vec<ServerEntry>,
}

impl ConfigBuilder {
    /// Add a server endpoint (`host:port`)
    pub fn server(mut self, addr: impl Into<String>) -> Self {
        self.servers.push(ServerEntry::Unresolved(addr.into()));
        self
    }

    /// Add several server endpoints
    pub fn servers<I, S>(mut self, addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servers
            .extend(addrs.into_iter().map(|a| ServerEntry::Unresolved(a.into())));
        self
    }

    /// Add an already resolved server endpoint
    pub fn server_addr(mut self, addr: SocketAddr) -> Self {
        self.servers.push(ServerEntry::Resolved(addr));
        self
    }

    /// Set the local bind address
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = Some(addr);
        self
    }

    /// Set the response timeout
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Set the receiver socket timeout
    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.config.receive_timeout = timeout;
        self
    }

    /// Set the receive buffer size (in bytes)
    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.config.receive_buffer_size = size;
        self
    }

    /// Enable or disable receiver diagnostics
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    /// Set the unknown reply policy
    pub fn unknown_reply_policy(mut self, policy: UnknownReplyPolicy) -> Self {
        self.config.unknown_reply_policy = policy;
        self
    }

    /// Resolve server addresses and validate the result
    pub fn build(self) -> Result<Config> {
        let mut config = self.config;
        for entry in &self.servers {
            let addr = match entry {
                ServerEntry::Resolved(addr) => *addr,
                ServerEntry::Unresolved(server) => resolve(server)?,
            };
            config.servers.push(addr);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Resolve `host:port`, preferring an IPv4 address when several are returned
fn resolve(server: &str) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = server
        .to_socket_addrs()
        .map_err(|e| MemcachedError::Config(format!("cannot resolve {}: {}", server, e)))?
        .collect();

    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| MemcachedError::Config(format!("no address found for {}", server)))
}

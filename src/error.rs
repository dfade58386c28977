//! Error types for memcached-udp
//!
//! Provides a unified error type for all client operations.

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias using MemcachedError
pub type Result<T> = std::result::Result<T, MemcachedError>;

/// Unified error type for memcached-udp operations
#[derive(Debug, Error)]
pub enum MemcachedError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    /// No reply arrived for an outstanding request before the deadline.
    #[error("Memcached server is not responding: {server}")]
    ServerNotResponding { server: SocketAddr },

    /// The server answered a store with something other than `STORED`.
    #[error("Error storing \"{key}\" in {server}: {reply}")]
    Store {
        key: String,
        server: SocketAddr,
        reply: String,
    },

    /// The request id counter wrapped into a request that is still pending.
    #[error("Request id already exists for server [server={server}, request_id={request_id}]")]
    AllocationCollision { server: SocketAddr, request_id: u16 },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

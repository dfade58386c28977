//! Command definitions
//!
//! Requests the client sends to a server.

use crate::error::{MemcachedError, Result};

/// Longest key the memcached text protocol accepts
pub const MAX_KEY_LENGTH: usize = 250;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Get,
}

/// A request to a server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a value under a key
    Set { key: String, value: String },

    /// Fetch the value stored under a key
    Get { key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
        }
    }

    /// The key this command addresses
    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. } | Command::Get { key } => key,
        }
    }
}

/// Check that a key can be carried by the text protocol.
///
/// Keys are 1 to 250 bytes with no whitespace or control characters;
/// anything else would corrupt the command line.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(MemcachedError::InvalidKey("key is empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(MemcachedError::InvalidKey(format!(
            "key is {} bytes (max {})",
            key.len(),
            MAX_KEY_LENGTH
        )));
    }
    if let Some(c) = key.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(MemcachedError::InvalidKey(format!(
            "key {:?} contains forbidden character {:?}",
            key, c
        )));
    }
    Ok(())
}

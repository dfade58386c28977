//! Server Selector
//!
//! Maps a key to one server by `servers[hash(key) % servers.len()]`.
//!
//! The hash is pluggable through [`KeyHasher`]. The only requirement is that
//! equal keys hash equally for the life of a server list. This is plain
//! modulo partitioning: changing the list remaps most keys.

use std::net::SocketAddr;

/// Hash function used to partition keys across servers
pub trait KeyHasher: Send + Sync {
    fn hash_key(&self, key: &[u8]) -> u64;
}

/// CRC32 of the key bytes (the default)
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl KeyHasher for Crc32Hasher {
    fn hash_key(&self, key: &[u8]) -> u64 {
        u64::from(crc32fast::hash(key))
    }
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8]) -> u64 + Send + Sync,
{
    fn hash_key(&self, key: &[u8]) -> u64 {
        self(key)
    }
}

/// Pick the server for `key` from a non-empty server list
///
/// # Panics
/// Panics if `servers` is empty.
pub fn pick<H: KeyHasher + ?Sized>(key: &str, servers: &[SocketAddr], hasher: &H) -> SocketAddr {
    let index = hasher.hash_key(key.as_bytes()) % servers.len() as u64;
    servers[index as usize]
}

/// A fixed server list paired with its hash function
pub struct ServerSelector<H: KeyHasher = Crc32Hasher> {
    servers: Vec<SocketAddr>,
    hasher: H,
}

impl<H: KeyHasher> ServerSelector<H> {
    /// Returns `None` for an empty server list
    pub fn new(servers: Vec<SocketAddr>, hasher: H) -> Option<Self> {
        if servers.is_empty() {
            return None;
        }
        Some(Self { servers, hasher })
    }

    /// Server responsible for `key`
    pub fn pick(&self, key: &str) -> SocketAddr {
        pick(key, &self.servers, &self.hasher)
    }

    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }
}

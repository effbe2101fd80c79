//! Store Module
//!
//! The byte-oriented backend the typed client sits on.
//!
//! ## Responsibilities
//! - Store and fetch `(payload, tag)` entries under string keys
//! - Report storage outcomes as memcached-style statuses
//! - Server list configuration and per-server statistics
//!
//! The codec never looks at these statuses; they travel back to the caller
//! as the backend produced them.

mod memory;
mod server;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::codec::{EncodedEntry, Tag};
use crate::error::Result;

pub use memory::{MemoryStore, MAX_KEY_LENGTH};
pub use server::{ServerSpec, MAX_SERVER_WEIGHT};

/// Outcome of a mutating backend command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// Value was written
    Stored,

    /// Condition for add/replace was not met, or no server could take it
    NotStored,

    /// Compare-and-swap conflict
    Exists,

    /// Key was not present
    NotFound,

    /// Key was removed
    Deleted,

    /// Command succeeded with nothing else to report
    Ok,
}

/// Statistics reported by a single server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStats {
    /// `host:port` of the reporting server
    pub server: String,

    /// Raw name/value pairs; values are left as the server sent them
    pub fields: BTreeMap<String, String>,
}

impl ServerStats {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// A byte-only key-value cache backend
///
/// All methods take `&self`; implementations handle their own locking.
pub trait ByteStore: Send + Sync {
    /// Store unconditionally
    fn set(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus>;

    /// Store only if the key is absent
    fn add(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus>;

    /// Store only if the key is present
    fn replace(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus>;

    /// Fetch one entry with its tag; `None` on a miss
    fn get(&self, key: &str) -> Result<Option<EncodedEntry>>;

    /// Fetch many entries; missing keys are left out of the map
    fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, EncodedEntry>>;

    fn delete(&self, key: &str) -> Result<StoreStatus>;

    /// Add `delta` to a decimal counter; `None` if the key is absent
    fn incr(&self, key: &str, delta: u64) -> Result<Option<u64>>;

    /// Subtract `delta` from a decimal counter; `None` if the key is absent
    fn decr(&self, key: &str, delta: u64) -> Result<Option<u64>>;

    fn flush_all(&self) -> Result<StoreStatus>;

    fn stats(&self) -> Result<Vec<ServerStats>>;

    /// Replace the server list
    fn set_servers(&self, servers: &[ServerSpec]) -> Result<()>;

    /// Drop open connections; they are re-established on next use
    fn disconnect_all(&self) {}
}

impl<S: ByteStore + ?Sized> ByteStore for Arc<S> {
    fn set(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus> {
        (**self).set(key, payload, tag, ttl)
    }

    fn add(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus> {
        (**self).add(key, payload, tag, ttl)
    }

    fn replace(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus> {
        (**self).replace(key, payload, tag, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<EncodedEntry>> {
        (**self).get(key)
    }

    fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, EncodedEntry>> {
        (**self).get_multi(keys)
    }

    fn delete(&self, key: &str) -> Result<StoreStatus> {
        (**self).delete(key)
    }

    fn incr(&self, key: &str, delta: u64) -> Result<Option<u64>> {
        (**self).incr(key, delta)
    }

    fn decr(&self, key: &str, delta: u64) -> Result<Option<u64>> {
        (**self).decr(key, delta)
    }

    fn flush_all(&self) -> Result<StoreStatus> {
        (**self).flush_all()
    }

    fn stats(&self) -> Result<Vec<ServerStats>> {
        (**self).stats()
    }

    fn set_servers(&self, servers: &[ServerSpec]) -> Result<()> {
        (**self).set_servers(servers)
    }

    fn disconnect_all(&self) {
        (**self).disconnect_all()
    }
}

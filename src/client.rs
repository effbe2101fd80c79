//! Typed Client
//!
//! Puts the value codec in front of a `ByteStore`.
//!
//! ## Responsibilities
//! - Encode values on `set`/`add`/`replace`, decode them on `get`/`get_multi`
//! - Hand every other command straight to the store
//! - Return the store's statuses exactly as reported

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{decode, encode, EncodedEntry, Value};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::store::{ByteStore, ServerSpec, ServerStats, StoreStatus};

/// Typed cache client over any byte store
///
/// Holds no state besides the store and its config, so it is `Sync`
/// whenever the store is.
pub struct TypedClient<S> {
    /// Backend receiving encoded entries
    store: S,

    /// Client configuration
    config: ClientConfig,
}

/// Which storage command to issue
#[derive(Debug, Clone, Copy)]
enum StoreCommand {
    Set,
    Add,
    Replace,
}

impl<S: ByteStore> TypedClient<S> {
    /// Wrap a store as-is, with default config and without touching its
    /// server list
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: ClientConfig::default(),
        }
    }

    /// Wrap a store and hand it the configured server list
    pub fn connect(config: ClientConfig, store: S) -> Result<Self> {
        store.set_servers(&config.servers)?;
        tracing::debug!("Client connected to {} servers", config.servers.len());
        Ok(Self { store, config })
    }

    // =========================================================================
    // Storage Commands
    // =========================================================================

    /// Store a value unconditionally
    ///
    /// `ttl` is in seconds; `None` uses the configured default.
    pub fn set(&self, key: &str, value: impl Into<Value>, ttl: Option<u32>) -> Result<StoreStatus> {
        self.store_value(StoreCommand::Set, key, &value.into(), ttl)
    }

    /// Store a value only if the key does not exist yet
    pub fn add(&self, key: &str, value: impl Into<Value>, ttl: Option<u32>) -> Result<StoreStatus> {
        self.store_value(StoreCommand::Add, key, &value.into(), ttl)
    }

    /// Store a value only if the key already exists
    pub fn replace(
        &self,
        key: &str,
        value: impl Into<Value>,
        ttl: Option<u32>,
    ) -> Result<StoreStatus> {
        self.store_value(StoreCommand::Replace, key, &value.into(), ttl)
    }

    /// Store any serde type as a structured value
    pub fn set_serialized<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<u32>,
    ) -> Result<StoreStatus> {
        let value = Value::from_serialize(value)?;
        self.store_value(StoreCommand::Set, key, &value, ttl)
    }

    fn store_value(
        &self,
        command: StoreCommand,
        key: &str,
        value: &Value,
        ttl: Option<u32>,
    ) -> Result<StoreStatus> {
        // Encode before touching the store; nothing is written on failure
        let entry = encode(value)?;
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        tracing::trace!(
            "{:?} {} ({:?}, {} bytes, ttl {})",
            command,
            key,
            value.category(),
            entry.payload.len(),
            ttl
        );

        match command {
            StoreCommand::Set => self.store.set(key, &entry.payload, entry.tag, ttl),
            StoreCommand::Add => self.store.add(key, &entry.payload, entry.tag, ttl),
            StoreCommand::Replace => self.store.replace(key, &entry.payload, entry.tag, ttl),
        }
    }

    // =========================================================================
    // Retrieval Commands
    // =========================================================================

    /// Fetch and decode a value
    ///
    /// `None` for a miss, and for a structured payload that can no longer be
    /// read.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        match self.store.get(key)? {
            Some(entry) => decode(&entry),
            None => Ok(None),
        }
    }

    /// Fetch the stored payload and tag without decoding
    pub fn get_raw(&self, key: &str) -> Result<Option<EncodedEntry>> {
        self.store.get(key)
    }

    /// Fetch a structured value as a serde type
    pub fn get_deserialized<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)?
            .map(|value| value.deserialize_into())
            .transpose()
    }

    /// Fetch several keys in one round trip
    ///
    /// Each hit is decoded on its own. Misses, and structured entries that
    /// decode to nothing, are left out of the result.
    pub fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let entries = self.store.get_multi(keys)?;
        let mut values = HashMap::with_capacity(entries.len());

        for (key, entry) in entries {
            if let Some(value) = decode(&entry)? {
                values.insert(key, value);
            }
        }

        tracing::trace!("get_multi: {} of {} keys found", values.len(), keys.len());
        Ok(values)
    }

    // =========================================================================
    // Pass-through Commands
    // =========================================================================

    pub fn delete(&self, key: &str) -> Result<StoreStatus> {
        self.store.delete(key)
    }

    /// Increment a decimal counter; `None` if the key is absent
    pub fn incr(&self, key: &str, delta: u64) -> Result<Option<u64>> {
        self.store.incr(key, delta)
    }

    /// Decrement a decimal counter (floored at zero); `None` if absent
    pub fn decr(&self, key: &str, delta: u64) -> Result<Option<u64>> {
        self.store.decr(key, delta)
    }

    pub fn flush_all(&self) -> Result<StoreStatus> {
        self.store.flush_all()
    }

    /// Per-server statistics, values left as the servers sent them
    pub fn stats(&self) -> Result<Vec<ServerStats>> {
        self.store.stats()
    }

    pub fn set_servers(&self, servers: &[ServerSpec]) -> Result<()> {
        self.store.set_servers(servers)
    }

    /// Parse `host:port` strings and install them as the server list
    pub fn set_server_addrs(&self, addrs: &[&str]) -> Result<()> {
        let servers = addrs
            .iter()
            .map(|addr| ServerSpec::parse(addr))
            .collect::<Result<Vec<_>>>()?;
        self.store.set_servers(&servers)
    }

    pub fn disconnect_all(&self) {
        self.store.disconnect_all()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

//! In-memory store
//!
//! A single-process `ByteStore` that follows memcached's command semantics.
//! Used for tests, benchmarks and the CLI demo; it keeps one shared keyspace
//! no matter how many servers are configured.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::codec::{EncodedEntry, Tag};
use crate::error::{Result, TagCacheError};

use super::{ByteStore, ServerSpec, ServerStats, StoreStatus};

/// Longest key memcached accepts (bytes)
pub const MAX_KEY_LENGTH: usize = 250;

/// TTLs above this many seconds are absolute unix timestamps
const RELATIVE_TTL_LIMIT: u32 = 60 * 60 * 24 * 30;

/// A stored payload with its tag and deadline
#[derive(Debug, Clone)]
struct Item {
    payload: Bytes,
    tag: Tag,
    expires_at: Option<SystemTime>,
}

impl Item {
    fn is_live(&self, now: SystemTime) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }

    fn entry(&self) -> EncodedEntry {
        EncodedEntry {
            payload: self.payload.clone(),
            tag: self.tag,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreMode {
    Set,
    Add,
    Replace,
}

#[derive(Debug, Clone, Copy)]
enum CounterOp {
    Incr,
    Decr,
}

/// In-memory memcached-semantics store
///
/// ## Concurrency:
/// - `items`: RwLock (concurrent gets, exclusive mutations)
/// - `servers`: RwLock, written only by `set_servers`
/// - Counters: atomics (lock-free)
pub struct MemoryStore {
    /// Key → item
    items: RwLock<HashMap<String, Item>>,

    /// Configured servers; with none active every command misses
    servers: RwLock<Vec<ServerSpec>>,

    /// Creation time, for the `uptime` stat
    started: Instant,

    cmd_get: AtomicU64,
    cmd_set: AtomicU64,
    get_hits: AtomicU64,
    get_misses: AtomicU64,
    total_items: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store with no servers configured
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            servers: RwLock::new(Vec::new()),
            started: Instant::now(),
            cmd_get: AtomicU64::new(0),
            cmd_set: AtomicU64::new(0),
            get_hits: AtomicU64::new(0),
            get_misses: AtomicU64::new(0),
            total_items: AtomicU64::new(0),
        }
    }

    /// Create an empty store serving the given servers
    pub fn with_servers(servers: Vec<ServerSpec>) -> Self {
        let store = Self::new();
        *store.servers.write() = servers;
        store
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        let now = SystemTime::now();
        self.items.read().values().filter(|item| item.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current server list
    pub fn servers(&self) -> Vec<ServerSpec> {
        self.servers.read().clone()
    }

    fn has_active_server(&self) -> bool {
        self.servers.read().iter().any(ServerSpec::is_active)
    }

    /// Keys must be 1..=250 bytes without whitespace or control characters
    fn check_key(key: &str) -> Result<()> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(TagCacheError::InvalidKey(format!(
                "key length {} outside 1..={}",
                key.len(),
                MAX_KEY_LENGTH
            )));
        }

        if key.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
            return Err(TagCacheError::InvalidKey(format!(
                "key {:?} contains whitespace or control characters",
                key
            )));
        }

        Ok(())
    }

    /// Convert a memcached exptime into a deadline
    fn deadline(ttl: u32, now: SystemTime) -> Option<SystemTime> {
        match ttl {
            0 => None,
            secs if secs <= RELATIVE_TTL_LIMIT => Some(now + Duration::from_secs(secs.into())),
            secs => Some(UNIX_EPOCH + Duration::from_secs(secs.into())),
        }
    }

    fn store(
        &self,
        mode: StoreMode,
        key: &str,
        payload: &[u8],
        tag: Tag,
        ttl: u32,
    ) -> Result<StoreStatus> {
        Self::check_key(key)?;
        self.cmd_set.fetch_add(1, Ordering::Relaxed);

        if !self.has_active_server() {
            tracing::debug!("{:?} {}: no active server", mode, key);
            return Ok(StoreStatus::NotStored);
        }

        let now = SystemTime::now();
        let mut items = self.items.write();
        let present = items.get(key).is_some_and(|item| item.is_live(now));

        let allowed = match mode {
            StoreMode::Set => true,
            StoreMode::Add => !present,
            StoreMode::Replace => present,
        };
        if !allowed {
            return Ok(StoreStatus::NotStored);
        }

        items.insert(
            key.to_string(),
            Item {
                payload: Bytes::copy_from_slice(payload),
                tag,
                expires_at: Self::deadline(ttl, now),
            },
        );
        self.total_items.fetch_add(1, Ordering::Relaxed);

        Ok(StoreStatus::Stored)
    }

    fn counter(&self, op: CounterOp, key: &str, delta: u64) -> Result<Option<u64>> {
        Self::check_key(key)?;

        if !self.has_active_server() {
            return Ok(None);
        }

        let now = SystemTime::now();
        let mut items = self.items.write();
        let item = match items.get_mut(key) {
            Some(item) if item.is_live(now) => item,
            _ => return Ok(None),
        };

        // A non-numeric value is a failed command, reported as a miss
        let current = match std::str::from_utf8(&item.payload)
            .ok()
            .map(|s| s.trim_end_matches(' '))
            .and_then(|s| s.parse::<u64>().ok())
        {
            Some(current) => current,
            None => {
                tracing::debug!("{:?} {}: value is not a decimal counter", op, key);
                return Ok(None);
            }
        };

        // incr wraps at 2^64, decr stops at zero
        let updated = match op {
            CounterOp::Incr => current.wrapping_add(delta),
            CounterOp::Decr => current.saturating_sub(delta),
        };

        item.payload = Bytes::from(updated.to_string());
        Ok(Some(updated))
    }

    /// Look up a live item, counting the hit or miss
    fn lookup(&self, items: &HashMap<String, Item>, key: &str, now: SystemTime) -> Option<EncodedEntry> {
        self.cmd_get.fetch_add(1, Ordering::Relaxed);
        match items.get(key).filter(|item| item.is_live(now)) {
            Some(item) => {
                self.get_hits.fetch_add(1, Ordering::Relaxed);
                Some(item.entry())
            }
            None => {
                self.get_misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn stats_fields(&self) -> BTreeMap<String, String> {
        let now = SystemTime::now();
        let items = self.items.read();
        let live = items.values().filter(|item| item.is_live(now));
        let (curr_items, bytes) = live.fold((0u64, 0u64), |(count, bytes), item| {
            (count + 1, bytes + item.payload.len() as u64)
        });
        let unix_time = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        let fields = [
            ("pid", std::process::id().to_string()),
            ("uptime", self.started.elapsed().as_secs().to_string()),
            ("time", unix_time.to_string()),
            ("version", crate::VERSION.to_string()),
            ("curr_items", curr_items.to_string()),
            ("total_items", self.total_items.load(Ordering::Relaxed).to_string()),
            ("bytes", bytes.to_string()),
            ("cmd_get", self.cmd_get.load(Ordering::Relaxed).to_string()),
            ("cmd_set", self.cmd_set.load(Ordering::Relaxed).to_string()),
            ("get_hits", self.get_hits.load(Ordering::Relaxed).to_string()),
            ("get_misses", self.get_misses.load(Ordering::Relaxed).to_string()),
        ];

        fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStore for MemoryStore {
    fn set(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus> {
        self.store(StoreMode::Set, key, payload, tag, ttl)
    }

    fn add(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus> {
        self.store(StoreMode::Add, key, payload, tag, ttl)
    }

    fn replace(&self, key: &str, payload: &[u8], tag: Tag, ttl: u32) -> Result<StoreStatus> {
        self.store(StoreMode::Replace, key, payload, tag, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<EncodedEntry>> {
        Self::check_key(key)?;

        if !self.has_active_server() {
            self.cmd_get.fetch_add(1, Ordering::Relaxed);
            self.get_misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        let items = self.items.read();
        Ok(self.lookup(&items, key, SystemTime::now()))
    }

    fn get_multi(&self, keys: &[&str]) -> Result<HashMap<String, EncodedEntry>> {
        for key in keys {
            Self::check_key(key)?;
        }

        let mut found = HashMap::with_capacity(keys.len());
        if !self.has_active_server() {
            return Ok(found);
        }

        let now = SystemTime::now();
        let items = self.items.read();
        for key in keys {
            if let Some(entry) = self.lookup(&items, key, now) {
                found.insert(key.to_string(), entry);
            }
        }

        Ok(found)
    }

    fn delete(&self, key: &str) -> Result<StoreStatus> {
        Self::check_key(key)?;

        if !self.has_active_server() {
            return Ok(StoreStatus::NotFound);
        }

        let now = SystemTime::now();
        match self.items.write().remove(key) {
            Some(item) if item.is_live(now) => Ok(StoreStatus::Deleted),
            _ => Ok(StoreStatus::NotFound),
        }
    }

    fn incr(&self, key: &str, delta: u64) -> Result<Option<u64>> {
        self.counter(CounterOp::Incr, key, delta)
    }

    fn decr(&self, key: &str, delta: u64) -> Result<Option<u64>> {
        self.counter(CounterOp::Decr, key, delta)
    }

    fn flush_all(&self) -> Result<StoreStatus> {
        let mut items = self.items.write();
        tracing::debug!("Flushing {} items", items.len());
        items.clear();
        Ok(StoreStatus::Ok)
    }

    fn stats(&self) -> Result<Vec<ServerStats>> {
        let servers = self.servers.read().clone();
        if servers.is_empty() {
            return Ok(Vec::new());
        }

        let fields = self.stats_fields();
        Ok(servers
            .iter()
            .map(|server| ServerStats {
                server: server.addr().to_string(),
                fields: fields.clone(),
            })
            .collect())
    }

    fn set_servers(&self, servers: &[ServerSpec]) -> Result<()> {
        tracing::debug!("Server list replaced: {} servers", servers.len());
        *self.servers.write() = servers.to_vec();
        Ok(())
    }
}

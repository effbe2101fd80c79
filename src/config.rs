//! Configuration for tagcache
//!
//! Centralized client configuration with sensible defaults.

use crate::error::Result;
use crate::store::ServerSpec;

/// Default memcached address used when nothing else is configured
pub const DEFAULT_SERVER: &str = "127.0.0.1:11211";

/// Main configuration for a [`TypedClient`](crate::TypedClient)
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -------------------------------------------------------------------------
    // Backend Configuration
    // -------------------------------------------------------------------------
    /// Servers handed to the backend on connect, in order
    pub servers: Vec<ServerSpec>,

    // -------------------------------------------------------------------------
    // Storage Defaults
    // -------------------------------------------------------------------------
    /// TTL (seconds) applied when a storage call passes `ttl: None`.
    /// `0` means the entry never expires.
    pub default_ttl: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            servers: vec![ServerSpec::unweighted(DEFAULT_SERVER)],
            default_ttl: 0,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Replace the server list
    pub fn servers(mut self, servers: Vec<ServerSpec>) -> Self {
        self.config.servers = servers;
        self
    }

    /// Parse and replace the server list from `host:port` strings
    pub fn server_addrs<I, S>(mut self, addrs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.servers = addrs
            .into_iter()
            .map(|addr| ServerSpec::parse(addr.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// Set the default TTL (in seconds)
    pub fn default_ttl(mut self, secs: u32) -> Self {
        self.config.default_ttl = secs;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

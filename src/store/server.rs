//! Server specifications
//!
//! Addresses and weights handed to a backend's server list.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TagCacheError};

/// Weights above this are capped
pub const MAX_SERVER_WEIGHT: u32 = 15;

/// One backend server: `host:port` plus a relative weight
///
/// A weight of zero keeps the server in the list without giving it any
/// share of the keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerSpec {
    addr: String,
    weight: u32,
}

impl ServerSpec {
    /// Parse a bare `host:port` address with weight 1
    pub fn parse(addr: &str) -> Result<Self> {
        Self::weighted(addr, 1)
    }

    /// Build an `(address, weight)` pair, capping the weight at
    /// [`MAX_SERVER_WEIGHT`]
    pub fn weighted(addr: &str, weight: u32) -> Result<Self> {
        let addr = addr.trim();

        let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
            TagCacheError::InvalidServer(format!("expected \"server:port\" but \"{}\" found", addr))
        })?;

        if host.is_empty() {
            return Err(TagCacheError::InvalidServer(format!(
                "missing host in \"{}\"",
                addr
            )));
        }

        port.parse::<u16>().map_err(|_| {
            TagCacheError::InvalidServer(format!("invalid port \"{}\" in \"{}\"", port, addr))
        })?;

        Ok(Self {
            addr: addr.to_string(),
            weight: weight.min(MAX_SERVER_WEIGHT),
        })
    }

    /// Known-good constant address (defaults only)
    pub(crate) fn unweighted(addr: &'static str) -> Self {
        Self {
            addr: addr.to_string(),
            weight: 1,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// True when the server takes part in key distribution
    pub fn is_active(&self) -> bool {
        self.weight > 0
    }
}

impl FromStr for ServerSpec {
    type Err = TagCacheError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<(&str, u32)> for ServerSpec {
    type Error = TagCacheError;

    fn try_from((addr, weight): (&str, u32)) -> Result<Self> {
        Self::weighted(addr, weight)
    }
}

impl fmt::Display for ServerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.addr)
    }
}

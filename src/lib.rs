//! # tagcache
//!
//! A typed value layer over byte-oriented, memcached-style caches:
//! - Every value is stored as a byte payload plus a category tag
//! - Text, i64 integers, arbitrary-precision integers and structured data
//!   all round-trip losslessly
//! - Unreadable structured payloads degrade to a miss instead of an error
//! - Any backend implementing `ByteStore` can sit underneath
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Application                             │
//! │                  (typed Values)                              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    TypedClient                               │
//! │          encode on store / decode on fetch                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ (payload, tag)
//!                       ▼
//!               ┌───────────────┐
//!               │   ByteStore   │
//!               │ (memcached /  │
//!               │  MemoryStore) │
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod store;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TagCacheError, Result};
pub use config::ClientConfig;
pub use codec::{decode, encode, Datum, EncodedEntry, Tag, Value, ValueCategory};
pub use store::{ByteStore, MemoryStore, ServerSpec, ServerStats, StoreStatus};
pub use client::TypedClient;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tagcache
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

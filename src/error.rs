//! Error types for tagcache
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TagCacheError
pub type Result<T> = std::result::Result<T, TagCacheError>;

/// Unified error type for tagcache operations
#[derive(Debug, Error)]
pub enum TagCacheError {
    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// The value cannot be represented by the structured serializer.
    #[error("Unserializable value: {0}")]
    UnserializableValue(String),

    /// A numeric tag was stored next to a payload that is not decimal text.
    #[error("Corrupt encoding for tag 0x{tag:x}: {reason}")]
    CorruptEncoding { tag: u32, reason: String },

    /// Typed (serde) conversion out of a decoded value failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Argument Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid server: {0}")]
    InvalidServer(String),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

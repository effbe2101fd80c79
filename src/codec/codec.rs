//! Value codec
//!
//! Encoding and decoding between application values and stored entries.
//!
//! ## Payload Format by Tag
//!
//! - TEXT (0):          the raw bytes, unescaped
//! - SMALL_INTEGER (2): decimal ASCII, `-` for negatives, no `+`
//! - LARGE_INTEGER (4): decimal ASCII, same rules
//! - STRUCTURED (1):    framed bincode body
//!
//! ### Structured Frame
//! ```text
//! ┌──────────┬───────────┬──────────┬─────────────────────────┐
//! │ Magic(1) │ Version(1)│ CRC32(4) │   bincode(Datum) body   │
//! └──────────┴───────────┴──────────┴─────────────────────────┘
//! ```

use bincode::Options;
use bytes::{BufMut, Bytes, BytesMut};
use num_bigint::BigInt;
use thiserror::Error;

use crate::error::{Result, TagCacheError};

use super::{Datum, Tag, Value, ValueCategory};

/// First byte of every structured payload
pub const STRUCTURED_MAGIC: u8 = 0xD7;

/// Structured frame version written by this codec
pub const STRUCTURED_VERSION: u8 = 1;

/// Header size: 1 byte magic + 1 byte version + 4 bytes CRC
pub const STRUCTURED_HEADER_SIZE: usize = 6;

/// Maximum structured body size (1 MB, the memcached default item limit)
pub const MAX_STRUCTURED_SIZE: u64 = 1024 * 1024;

/// A payload plus its tag, exactly as the backend stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEntry {
    pub payload: Bytes,
    pub tag: Tag,
}

impl EncodedEntry {
    pub fn new(payload: impl Into<Bytes>, tag: impl Into<Tag>) -> Self {
        Self {
            payload: payload.into(),
            tag: tag.into(),
        }
    }
}

/// Why a structured payload was rejected
#[derive(Debug, Error)]
enum StructuredFault {
    #[error("payload too short: {0} bytes")]
    Truncated(usize),

    #[error("bad magic byte 0x{0:02x}")]
    BadMagic(u8),

    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("body does not deserialize: {0}")]
    Body(#[from] bincode::Error),
}

/// bincode settings for structured bodies: fixed-width ints, size-limited,
/// trailing bytes rejected
fn structured_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_STRUCTURED_SIZE)
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value into a payload and tag
///
/// Pure: the same value always yields the same entry.
pub fn encode(value: &Value) -> Result<EncodedEntry> {
    let category = value.category();

    let payload = match value {
        Value::Text(bytes) => Bytes::copy_from_slice(bytes),
        Value::SmallInteger(n) => Bytes::from(n.to_string()),
        Value::LargeInteger(n) => Bytes::from(n.to_string()),
        Value::Structured(datum) => encode_structured(datum)?,
    };

    Ok(EncodedEntry {
        payload,
        tag: category.tag(),
    })
}

/// Frame a datum: magic + version + crc32(body) + body
fn encode_structured(datum: &Datum) -> Result<Bytes> {
    let body = structured_options()
        .serialize(datum)
        .map_err(|e| TagCacheError::UnserializableValue(e.to_string()))?;

    let mut frame = BytesMut::with_capacity(STRUCTURED_HEADER_SIZE + body.len());
    frame.put_u8(STRUCTURED_MAGIC);
    frame.put_u8(STRUCTURED_VERSION);
    frame.put_u32(crc32fast::hash(&body));
    frame.extend_from_slice(&body);

    Ok(frame.freeze())
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a stored entry back into a value
///
/// Returns `Ok(None)` when a structured payload cannot be read; the fault is
/// logged and swallowed. Entries with no known tag bit come back as text.
/// A numeric tag over non-decimal bytes is `CorruptEncoding`.
pub fn decode(entry: &EncodedEntry) -> Result<Option<Value>> {
    let tag = entry.tag;
    let payload = entry.payload.as_ref();

    match tag.category() {
        Some(ValueCategory::Text) => Ok(Some(Value::Text(payload.to_vec()))),
        Some(ValueCategory::SmallInteger) => decode_small_integer(payload, tag).map(Some),
        Some(ValueCategory::LargeInteger) => decode_large_integer(payload, tag).map(Some),
        Some(ValueCategory::Structured) => match decode_structured(payload) {
            Ok(datum) => Ok(Some(Value::Structured(datum))),
            Err(fault) => {
                tracing::warn!(
                    target: "tagcache::codec",
                    "Structured payload rejected ({} bytes, tag {}): {}",
                    payload.len(),
                    tag,
                    fault
                );
                Ok(None)
            }
        },
        None => {
            tracing::warn!(
                target: "tagcache::codec",
                "Unknown tag on decode: {}, returning payload as text",
                tag
            );
            Ok(Some(Value::Text(payload.to_vec())))
        }
    }
}

/// Decode an i64-tagged payload
///
/// Decimal text that overflows i64 (a backend `incr` can push a counter past
/// `i64::MAX`) is returned as a large integer.
fn decode_small_integer(payload: &[u8], tag: Tag) -> Result<Value> {
    let digits = decimal_text(payload, tag)?;
    match digits.parse::<i64>() {
        Ok(n) => Ok(Value::SmallInteger(n)),
        Err(_) => parse_bigint(digits, tag).map(Value::integer),
    }
}

fn decode_large_integer(payload: &[u8], tag: Tag) -> Result<Value> {
    let digits = decimal_text(payload, tag)?;
    parse_bigint(digits, tag).map(Value::integer)
}

fn parse_bigint(digits: &str, tag: Tag) -> Result<BigInt> {
    digits.parse::<BigInt>().map_err(|e| TagCacheError::CorruptEncoding {
        tag: tag.bits(),
        reason: e.to_string(),
    })
}

/// Validate a payload as signed decimal text and return it trimmed
///
/// memcached may space-pad a counter after `decr`, so surrounding ASCII
/// whitespace is ignored.
fn decimal_text(payload: &[u8], tag: Tag) -> Result<&str> {
    let text = std::str::from_utf8(payload).map_err(|e| TagCacheError::CorruptEncoding {
        tag: tag.bits(),
        reason: format!("payload is not UTF-8: {}", e),
    })?;
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());

    let digits = text.strip_prefix(&['-', '+'][..]).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TagCacheError::CorruptEncoding {
            tag: tag.bits(),
            reason: format!("payload {:?} is not a decimal integer", text),
        });
    }

    Ok(text)
}

/// Unframe and deserialize a structured payload
fn decode_structured(payload: &[u8]) -> std::result::Result<Datum, StructuredFault> {
    if payload.len() < STRUCTURED_HEADER_SIZE {
        return Err(StructuredFault::Truncated(payload.len()));
    }

    if payload[0] != STRUCTURED_MAGIC {
        return Err(StructuredFault::BadMagic(payload[0]));
    }

    if payload[1] != STRUCTURED_VERSION {
        return Err(StructuredFault::UnsupportedVersion(payload[1]));
    }

    let stored = u32::from_be_bytes([payload[2], payload[3], payload[4], payload[5]]);
    let body = &payload[STRUCTURED_HEADER_SIZE..];
    let computed = crc32fast::hash(body);
    if stored != computed {
        return Err(StructuredFault::ChecksumMismatch { stored, computed });
    }

    Ok(structured_options().deserialize(body)?)
}

//! Codec Module
//!
//! Converts application values into `(payload, tag)` entries for a
//! byte-only store, and back.
//!
//! ## Tag Bits
//! - 0x00: TEXT           - payload is the raw bytes
//! - 0x01: STRUCTURED     - payload is a framed bincode `Datum`
//! - 0x02: SMALL_INTEGER  - payload is decimal text within i64
//! - 0x04: LARGE_INTEGER  - payload is decimal text outside i64
//!
//! ## Failure Policy
//! - Encode errors propagate (`UnserializableValue`)
//! - Non-decimal numeric payloads propagate (`CorruptEncoding`)
//! - Unreadable structured payloads decode to absence, with a warning
//! - Unknown tags decode to raw text, with a warning

mod tag;
mod value;
mod datum;
#[allow(clippy::module_inception)]
mod codec;

pub use tag::{Tag, ValueCategory};
pub use value::Value;
pub use datum::Datum;
pub use codec::{
    encode, decode, EncodedEntry, MAX_STRUCTURED_SIZE, STRUCTURED_HEADER_SIZE, STRUCTURED_MAGIC,
    STRUCTURED_VERSION,
};

//! Application values
//!
//! The closed set of value shapes the codec knows how to store.

use num_bigint::BigInt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, TagCacheError};

use super::{Datum, ValueCategory};

/// A value as the application sees it
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Raw text; any byte (including NUL) is preserved
    Text(Vec<u8>),

    /// Whole number within `i64`
    SmallInteger(i64),

    /// Whole number outside `i64`
    LargeInteger(BigInt),

    /// Anything else
    Structured(Datum),
}

impl Value {
    /// Text value from anything byte-like
    pub fn text(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(bytes.into())
    }

    /// Integer value, picking the narrowest variant that holds it
    pub fn integer(n: impl Into<BigInt>) -> Self {
        let n = n.into();
        match i64::try_from(&n) {
            Ok(small) => Value::SmallInteger(small),
            Err(_) => Value::LargeInteger(n),
        }
    }

    /// Structured value from any serde type
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Datum::from_serialize(value).map(Value::Structured)
    }

    /// Classify the value
    ///
    /// A `LargeInteger` that fits in `i64` (inclusive of the bounds) is
    /// classified as `SmallInteger`.
    pub fn category(&self) -> ValueCategory {
        match self {
            Value::Text(_) => ValueCategory::Text,
            Value::SmallInteger(_) => ValueCategory::SmallInteger,
            Value::LargeInteger(n) if i64::try_from(n).is_ok() => ValueCategory::SmallInteger,
            Value::LargeInteger(_) => ValueCategory::LargeInteger,
            Value::Structured(_) => ValueCategory::Structured,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text as UTF-8, if it is text and valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::SmallInteger(n) => Some(*n),
            Value::LargeInteger(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    /// Any integer as a `BigInt`
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::SmallInteger(n) => Some(BigInt::from(*n)),
            Value::LargeInteger(n) => Some(n.clone()),
            _ => None,
        }
    }

    pub fn as_datum(&self) -> Option<&Datum> {
        match self {
            Value::Structured(datum) => Some(datum),
            _ => None,
        }
    }

    /// Read the value back as a serde type
    ///
    /// Structured values go through their datum; text is offered as a JSON
    /// string and small integers as JSON numbers.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Value::Structured(datum) => datum.deserialize_into(),
            Value::Text(bytes) => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| TagCacheError::Serialization(e.to_string()))?;
                serde_json::from_value(serde_json::Value::String(text.to_string()))
                    .map_err(|e| TagCacheError::Serialization(e.to_string()))
            }
            Value::SmallInteger(n) => serde_json::from_value((*n).into())
                .map_err(|e| TagCacheError::Serialization(e.to_string())),
            Value::LargeInteger(n) => Err(TagCacheError::Serialization(format!(
                "integer {} does not fit a serde number",
                n
            ))),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Value::Text(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Text(bytes)
    }
}

macro_rules! impl_from_small_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::SmallInteger(n.into())
                }
            }
        )*
    };
}

impl_from_small_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::integer(n)
                }
            }
        )*
    };
}

impl_from_wide_int!(u64, i128, u128, BigInt);

impl From<Datum> for Value {
    fn from(datum: Datum) -> Self {
        Value::Structured(datum)
    }
}

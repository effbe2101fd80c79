//! Structured values
//!
//! A `Datum` is a self-describing tree, so a structured payload can be read
//! back without knowing the type that produced it. Application types reach
//! it through serde's JSON data model.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::error::{Result, TagCacheError};

/// Self-describing structured value
///
/// Maps are ordered by key so the same datum always serializes to the same
/// bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    Nil,
    Bool(bool),
    Int(i64),
    /// Unsigned integers above `i64::MAX`
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Datum>),
    Map(BTreeMap<String, Datum>),
}

impl Datum {
    /// Build a map from `(key, value)` pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Datum>,
        I: IntoIterator<Item = (K, V)>,
    {
        Datum::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list from values
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Datum>,
        I: IntoIterator<Item = V>,
    {
        Datum::List(items.into_iter().map(Into::into).collect())
    }

    /// Convert any serde type into a datum
    ///
    /// Fails with `UnserializableValue` when the type has no JSON
    /// representation (e.g. maps keyed by non-strings).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| TagCacheError::UnserializableValue(e.to_string()))?;
        Ok(Self::from_json(json))
    }

    /// Read a serde type back out of a datum
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.to_json())
            .map_err(|e| TagCacheError::Serialization(e.to_string()))
    }

    /// Convert from a JSON document
    ///
    /// Integers above `i64::MAX` become `UInt`, so `u64` fields survive.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Datum::Nil,
            JsonValue::Bool(b) => Datum::Bool(b),
            JsonValue::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Datum::Int(i),
                (None, Some(u)) => Datum::UInt(u),
                (None, None) => Datum::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Datum::Text(s),
            JsonValue::Array(items) => Datum::List(items.into_iter().map(Self::from_json).collect()),
            JsonValue::Object(entries) => Datum::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a JSON document
    ///
    /// Non-finite floats become `null`; raw bytes become an array of numbers.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Datum::Nil => JsonValue::Null,
            Datum::Bool(b) => JsonValue::Bool(*b),
            Datum::Int(i) => JsonValue::Number((*i).into()),
            Datum::UInt(u) => JsonValue::Number((*u).into()),
            Datum::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Datum::Text(s) => JsonValue::String(s.clone()),
            Datum::Bytes(bytes) => {
                JsonValue::Array(bytes.iter().map(|b| JsonValue::Number((*b).into())).collect())
            }
            Datum::List(items) => JsonValue::Array(items.iter().map(Datum::to_json).collect()),
            Datum::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<JsonMap<_, _>>(),
            ),
        }
    }

    /// Look up a key when this datum is a map
    pub fn get(&self, key: &str) -> Option<&Datum> {
        match self {
            Datum::Map(entries) => entries.get(key),
            _ => None,
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Bool(b)
    }
}

impl From<i32> for Datum {
    fn from(i: i32) -> Self {
        Datum::Int(i.into())
    }
}

impl From<i64> for Datum {
    fn from(i: i64) -> Self {
        Datum::Int(i)
    }
}

impl From<u64> for Datum {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Datum::UInt(u), Datum::Int)
    }
}

impl From<f64> for Datum {
    fn from(f: f64) -> Self {
        Datum::Float(f)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::Text(s.to_string())
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::Text(s)
    }
}

impl From<Vec<Datum>> for Datum {
    fn from(items: Vec<Datum>) -> Self {
        Datum::List(items)
    }
}

impl From<BTreeMap<String, Datum>> for Datum {
    fn from(entries: BTreeMap<String, Datum>) -> Self {
        Datum::Map(entries)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Datum::Nil)
    }
}

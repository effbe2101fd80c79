//! Tag definitions
//!
//! The tag is the per-entry integer the backend stores next to a payload
//! (memcached calls it "flags"). tagcache uses three bits of it to record
//! the category a value was encoded from.

use std::fmt;

/// Category bits stored alongside every payload
///
/// `0` marks text; otherwise exactly one of the three known bits is set by
/// the encoder. Any other bit pattern is accepted from the backend but only
/// the known bits carry meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tag(u32);

impl Tag {
    /// Plain text payload (no bit set)
    pub const TEXT: Tag = Tag(0);

    /// Structured payload (bit 0)
    pub const STRUCTURED: Tag = Tag(1 << 0);

    /// Decimal integer that fits in `i64` (bit 1)
    pub const SMALL_INTEGER: Tag = Tag(1 << 1);

    /// Decimal integer outside `i64` (bit 2)
    pub const LARGE_INTEGER: Tag = Tag(1 << 2);

    /// Union of every bit the codec understands
    pub const KNOWN_BITS: u32 = Self::STRUCTURED.0 | Self::SMALL_INTEGER.0 | Self::LARGE_INTEGER.0;

    /// Wrap raw bits read from a backend
    pub const fn from_bits(bits: u32) -> Self {
        Tag(bits)
    }

    /// Raw bits as stored by the backend
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is set in `self` (and `other` is non-empty)
    pub const fn contains(self, other: Tag) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// True when the tag carries bits the codec does not know about
    pub const fn has_unknown_bits(self) -> bool {
        self.0 & !Self::KNOWN_BITS != 0
    }

    /// Resolve the category a stored entry should decode as
    ///
    /// Checks SmallInteger, then LargeInteger, then Structured; the first
    /// bit found wins. Returns `None` when no known bit is set on a
    /// non-zero tag.
    pub fn category(self) -> Option<ValueCategory> {
        if self.0 == 0 {
            Some(ValueCategory::Text)
        } else if self.contains(Self::SMALL_INTEGER) {
            Some(ValueCategory::SmallInteger)
        } else if self.contains(Self::LARGE_INTEGER) {
            Some(ValueCategory::LargeInteger)
        } else if self.contains(Self::STRUCTURED) {
            Some(ValueCategory::Structured)
        } else {
            None
        }
    }
}

impl From<u32> for Tag {
    fn from(bits: u32) -> Self {
        Tag(bits)
    }
}

impl From<Tag> for u32 {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Closed classification of application values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    Text,
    SmallInteger,
    LargeInteger,
    Structured,
}

impl ValueCategory {
    /// The tag the encoder writes for this category
    pub const fn tag(self) -> Tag {
        match self {
            ValueCategory::Text => Tag::TEXT,
            ValueCategory::SmallInteger => Tag::SMALL_INTEGER,
            ValueCategory::LargeInteger => Tag::LARGE_INTEGER,
            ValueCategory::Structured => Tag::STRUCTURED,
        }
    }
}

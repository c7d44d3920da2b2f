//! PackStream marker byte constants and classification.
//!
//! Every encoded value starts with one marker byte. The marker fixes the
//! value's type and, for strings, lists, maps and structures, which length
//! prefix (none, 1, 2 or 4 bytes) follows it.

use crate::error::PackStreamError;

// Null
pub const NULL: u8 = 0xC0;

// Boolean
pub const FALSE: u8 = 0xC2;
pub const TRUE: u8 = 0xC3;

// Float (IEEE 754 double-precision)
pub const FLOAT_64: u8 = 0xC1;

// Integer (beyond TINY_INT range)
pub const INT_8: u8 = 0xC8;
pub const INT_16: u8 = 0xC9;
pub const INT_32: u8 = 0xCA;
pub const INT_64: u8 = 0xCB;

// TINY_INT: single byte, range -16..=127
// Positive: 0x00..=0x7F (0..127)
// Negative: 0xF0..=0xFF (-16..-1)
pub const TINY_INT_MIN: i64 = -16;
pub const TINY_INT_MAX: i64 = 127;

// Bytes (reserved, not implemented by this codec)
pub const BYTES_8: u8 = 0xCC;
pub const BYTES_16: u8 = 0xCD;
pub const BYTES_32: u8 = 0xCE;

// String
// TINY_STRING: 0x80..=0x8F (high nibble 0x8, low = byte length 0..15)
pub const STRING_8: u8 = 0xD0;
pub const STRING_16: u8 = 0xD1;
pub const STRING_32: u8 = 0xD2;

// List
// TINY_LIST: 0x90..=0x9F (high nibble 0x9, low = item count 0..15)
pub const LIST_8: u8 = 0xD4;
pub const LIST_16: u8 = 0xD5;
pub const LIST_32: u8 = 0xD6;

// Map
// TINY_MAP: 0xA0..=0xAF (high nibble 0xA, low = entry count 0..15)
pub const MAP_8: u8 = 0xD8;
pub const MAP_16: u8 = 0xD9;
pub const MAP_32: u8 = 0xDA;

// Structure
// TINY_STRUCT: 0xB0..=0xBF (high nibble 0xB, low = field count 0..15)
pub const STRUCT_8: u8 = 0xDC;
pub const STRUCT_16: u8 = 0xDD;

// High-nibble masks for tiny types.
pub const TINY_STRING_NIBBLE: u8 = 0x80;
pub const TINY_LIST_NIBBLE: u8 = 0x90;
pub const TINY_MAP_NIBBLE: u8 = 0xA0;
pub const TINY_STRUCT_NIBBLE: u8 = 0xB0;

/// Largest size that fits in the low nibble of a tiny marker.
pub const TINY_SIZE_MAX: usize = 15;

/// The nine value types of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Boolean,
    Integer,
    Float,
    Bytes,
    String,
    List,
    Map,
    Structure,
}

/// Width of the length prefix that follows a sized marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// Size packed into the marker's low nibble.
    Tiny(u8),
    U8,
    U16,
    U32,
}

impl SizeClass {
    /// Number of prefix bytes after the marker.
    pub fn prefix_len(self) -> usize {
        match self {
            Self::Tiny(_) => 0,
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// A classified marker byte.
///
/// Tiny variants carry the value or size packed into the byte itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Null,
    False,
    True,
    Float64,
    TinyInt(i8),
    Int8,
    Int16,
    Int32,
    Int64,
    Bytes8,
    Bytes16,
    Bytes32,
    TinyString(u8),
    String8,
    String16,
    String32,
    TinyList(u8),
    List8,
    List16,
    List32,
    TinyMap(u8),
    Map8,
    Map16,
    Map32,
    TinyStruct(u8),
    Struct8,
    Struct16,
}

/// A byte outside every defined marker range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown marker byte 0x{0:02X}")]
pub struct UnknownMarker(pub u8);

impl From<UnknownMarker> for PackStreamError {
    fn from(e: UnknownMarker) -> Self {
        Self::WrongMarker(e.0)
    }
}

impl Marker {
    /// Classifies a leading byte.
    ///
    /// Bytes that no range covers (0xC4..=0xC7, 0xCF, 0xD3, 0xD7, 0xDB,
    /// 0xDE..=0xEF) are rejected rather than read as null.
    pub fn classify(byte: u8) -> Result<Self, UnknownMarker> {
        let low = byte & 0x0F;
        let marker = match byte {
            0x00..=0x7F | 0xF0..=0xFF => Self::TinyInt(byte as i8),
            0x80..=0x8F => Self::TinyString(low),
            0x90..=0x9F => Self::TinyList(low),
            0xA0..=0xAF => Self::TinyMap(low),
            0xB0..=0xBF => Self::TinyStruct(low),
            NULL => Self::Null,
            FALSE => Self::False,
            TRUE => Self::True,
            FLOAT_64 => Self::Float64,
            INT_8 => Self::Int8,
            INT_16 => Self::Int16,
            INT_32 => Self::Int32,
            INT_64 => Self::Int64,
            BYTES_8 => Self::Bytes8,
            BYTES_16 => Self::Bytes16,
            BYTES_32 => Self::Bytes32,
            STRING_8 => Self::String8,
            STRING_16 => Self::String16,
            STRING_32 => Self::String32,
            LIST_8 => Self::List8,
            LIST_16 => Self::List16,
            LIST_32 => Self::List32,
            MAP_8 => Self::Map8,
            MAP_16 => Self::Map16,
            MAP_32 => Self::Map32,
            STRUCT_8 => Self::Struct8,
            STRUCT_16 => Self::Struct16,
            _ => return Err(UnknownMarker(byte)),
        };
        Ok(marker)
    }

    /// Returns the byte this marker was classified from.
    pub fn byte(self) -> u8 {
        match self {
            Self::Null => NULL,
            Self::False => FALSE,
            Self::True => TRUE,
            Self::Float64 => FLOAT_64,
            Self::TinyInt(v) => v as u8,
            Self::Int8 => INT_8,
            Self::Int16 => INT_16,
            Self::Int32 => INT_32,
            Self::Int64 => INT_64,
            Self::Bytes8 => BYTES_8,
            Self::Bytes16 => BYTES_16,
            Self::Bytes32 => BYTES_32,
            Self::TinyString(n) => TINY_STRING_NIBBLE | n,
            Self::String8 => STRING_8,
            Self::String16 => STRING_16,
            Self::String32 => STRING_32,
            Self::TinyList(n) => TINY_LIST_NIBBLE | n,
            Self::List8 => LIST_8,
            Self::List16 => LIST_16,
            Self::List32 => LIST_32,
            Self::TinyMap(n) => TINY_MAP_NIBBLE | n,
            Self::Map8 => MAP_8,
            Self::Map16 => MAP_16,
            Self::Map32 => MAP_32,
            Self::TinyStruct(n) => TINY_STRUCT_NIBBLE | n,
            Self::Struct8 => STRUCT_8,
            Self::Struct16 => STRUCT_16,
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::False | Self::True => ValueType::Boolean,
            Self::Float64 => ValueType::Float,
            Self::TinyInt(_) | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => {
                ValueType::Integer
            }
            Self::Bytes8 | Self::Bytes16 | Self::Bytes32 => ValueType::Bytes,
            Self::TinyString(_) | Self::String8 | Self::String16 | Self::String32 => {
                ValueType::String
            }
            Self::TinyList(_) | Self::List8 | Self::List16 | Self::List32 => ValueType::List,
            Self::TinyMap(_) | Self::Map8 | Self::Map16 | Self::Map32 => ValueType::Map,
            Self::TinyStruct(_) | Self::Struct8 | Self::Struct16 => ValueType::Structure,
        }
    }

    /// Total encoded length, marker included, for fixed-width scalars.
    ///
    /// Returns `None` for sized types, whose length depends on the prefix.
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            Self::Null | Self::False | Self::True | Self::TinyInt(_) => Some(1),
            Self::Int8 => Some(2),
            Self::Int16 => Some(3),
            Self::Int32 => Some(5),
            Self::Int64 | Self::Float64 => Some(9),
            _ => None,
        }
    }

    /// Length class for strings, lists, maps, structures and bytes.
    pub fn size_class(self) -> Option<SizeClass> {
        match self {
            Self::TinyString(n) | Self::TinyList(n) | Self::TinyMap(n) | Self::TinyStruct(n) => {
                Some(SizeClass::Tiny(n))
            }
            Self::String8 | Self::List8 | Self::Map8 | Self::Struct8 | Self::Bytes8 => {
                Some(SizeClass::U8)
            }
            Self::String16 | Self::List16 | Self::Map16 | Self::Struct16 | Self::Bytes16 => {
                Some(SizeClass::U16)
            }
            Self::String32 | Self::List32 | Self::Map32 | Self::Bytes32 => Some(SizeClass::U32),
            _ => None,
        }
    }
}

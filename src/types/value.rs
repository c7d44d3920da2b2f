//! PackStream value types.

use std::collections::HashMap;
use std::fmt;

use crate::error::PackStreamError;
use crate::marker::ValueType;

/// Type alias for PackStream maps (string keys, any values).
pub type ValueMap = HashMap<String, Value>;

/// A value in the PackStream format.
///
/// Integers of every wire width decode into the one `Integer` variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(ValueMap),
    Structure(Structure),
}

/// A signature-tagged sequence of fields.
///
/// The signature is an opaque tag chosen by the protocol layered on top
/// (nodes, relationships, messages); the codec never interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub signature: u8,
    pub fields: Vec<Value>,
}

impl Structure {
    pub fn new(signature: u8, fields: Vec<Value>) -> Self {
        Self { signature, fields }
    }
}

/// The unit null value, for callers that pack or unpack null on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Null;

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::List(_) => ValueType::List,
            Self::Map(_) => ValueType::Map,
            Self::Structure(_) => ValueType::Structure,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Integer` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a u64, if it is a non-negative `Integer`.
    pub fn as_uint(&self) -> Option<u64> {
        self.as_int().and_then(|i| u64::try_from(i).ok())
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a string reference, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Self::Structure(s) => Some(s),
            _ => None,
        }
    }
}

// -- Convenience conversions --

impl From<Null> for Value {
    fn from(_: Null) -> Self {
        Self::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

macro_rules! from_lossless_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(i: $t) -> Self {
                    Self::Integer(i64::from(i))
                }
            }
        )*
    };
}

from_lossless_int!(i8, i16, i32, u8, u16, u32);

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl TryFrom<u64> for Value {
    type Error = PackStreamError;

    fn try_from(u: u64) -> Result<Self, Self::Error> {
        i64::try_from(u)
            .map(Self::Integer)
            .map_err(|_| {
                PackStreamError::NotPackable(format!("{u} exceeds the 64-bit signed range"))
            })
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Self::Map(m)
    }
}

impl From<Structure> for Value {
    fn from(s: Structure) -> Self {
        Self::Structure(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                write!(f, "}}")
            }
            Self::Structure(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct<0x{:02X}>(", self.signature)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_accessors() {
        assert_eq!(Value::from(-42i8).as_int(), Some(-42));
        assert_eq!(Value::from(1000i16).as_int(), Some(1000));
        assert_eq!(Value::from(100_000i32).as_int(), Some(100_000));
        assert_eq!(Value::from(i64::MAX).as_int(), Some(i64::MAX));
        assert_eq!(Value::from("not an integer").as_int(), None);
        assert_eq!(Value::from(2.5f64).as_int(), None);
        assert_eq!(Value::from(true).as_int(), None);
    }

    #[test]
    fn uint_accessor_rejects_negatives() {
        assert_eq!(Value::from(42i8).as_uint(), Some(42));
        assert_eq!(Value::from(-42i8).as_uint(), None);
        assert_eq!(Value::from(0i64).as_uint(), Some(0));
        assert_eq!(Value::from(i64::MAX).as_uint(), Some(i64::MAX as u64));
        assert_eq!(Value::from("test").as_uint(), None);
    }

    #[test]
    fn u64_above_i64_is_not_packable() {
        assert_eq!(Value::try_from(7u64), Ok(Value::Integer(7)));
        assert!(matches!(
            Value::try_from(u64::MAX),
            Err(PackStreamError::NotPackable(_))
        ));
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
        assert!(Value::from(Null).is_null());
    }

    #[test]
    fn value_types() {
        assert_eq!(Value::Null.value_type(), ValueType::Null);
        assert_eq!(Value::from(vec![Value::Null]).value_type(), ValueType::List);
        assert_eq!(
            Value::from(Structure::new(0x4E, vec![])).value_type(),
            ValueType::Structure
        );
    }

    #[test]
    fn display() {
        let v = Value::List(vec![
            Value::Integer(1),
            Value::String("two".into()),
            Value::Null,
            Value::Structure(Structure::new(0x2A, vec![Value::Boolean(true)])),
        ]);
        assert_eq!(v.to_string(), "[1, \"two\", null, struct<0x2A>(true)]");
    }

    #[test]
    fn display_escapes_strings() {
        let v = Value::List(vec![Value::from("a\", \"b"), Value::from("line\nbreak")]);
        assert_eq!(v.to_string(), r#"["a\", \"b", "line\nbreak"]"#);

        let m = Value::Map(ValueMap::from([("k\"".to_string(), Value::Null)]));
        assert_eq!(m.to_string(), r#"{"k\"": null}"#);
    }
}

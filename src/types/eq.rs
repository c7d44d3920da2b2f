//! Comparisons between decoded values and plain Rust scalars.
//!
//! All integer widths collapse into `Value::Integer`, so an `i8` compares
//! equal to a `Value` that was encoded as Int64 whenever the logical numbers
//! match. Containers compare with the derived structural `PartialEq`, which
//! applies these same rules to every element.

use super::value::{Structure, Value};

macro_rules! int_eq {
    ($($t:ty),*) => {
        $(
            impl PartialEq<$t> for Value {
                fn eq(&self, other: &$t) -> bool {
                    matches!(self, Value::Integer(i) if i64::try_from(*other).is_ok_and(|o| o == *i))
                }
            }

            impl PartialEq<Value> for $t {
                fn eq(&self, other: &Value) -> bool {
                    other == self
                }
            }
        )*
    };
}

int_eq!(i8, i16, i32, i64, u8, u16, u32, u64);

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Value::Boolean(b) if b == other)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Value::Float(f) if f == other)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::String(s) if s == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<Structure> for Value {
    fn eq(&self, other: &Structure) -> bool {
        matches!(self, Value::Structure(s) if s == other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueMap;

    #[test]
    fn integers_compare_across_widths() {
        let v = Value::Integer(-17);
        assert_eq!(v, -17i8);
        assert_eq!(v, -17i16);
        assert_eq!(v, -17i32);
        assert_eq!(v, -17i64);
        assert_eq!(-17i8, v);
        assert_ne!(v, 17u8);
    }

    #[test]
    fn unsigned_out_of_range_never_matches() {
        assert_ne!(Value::Integer(-1), u64::MAX);
        assert_eq!(Value::Integer(i64::MAX), i64::MAX as u64);
    }

    #[test]
    fn kinds_must_match() {
        assert_ne!(Value::Float(1.0), 1i64);
        assert_ne!(Value::Integer(1), 1.0f64);
        assert_ne!(Value::Boolean(true), 1i64);
        assert_ne!(Value::String("1".into()), 1i64);
        assert_eq!(Value::String("a".into()), "a");
    }

    #[test]
    fn float_equality_is_ieee() {
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn containers_compare_structurally() {
        let a = Value::Map(ValueMap::from([
            ("x".to_string(), Value::from(1i8)),
            ("y".to_string(), Value::List(vec![Value::from(300i16)])),
        ]));
        let b = Value::Map(ValueMap::from([
            ("y".to_string(), Value::List(vec![Value::from(300i64)])),
            ("x".to_string(), Value::from(1i64)),
        ]));
        assert_eq!(a, b);

        let s = Structure::new(0x2A, vec![Value::from(1i8)]);
        assert_eq!(Value::Structure(s.clone()), s);
        assert_ne!(
            Value::Structure(s),
            Structure::new(0x2B, vec![Value::from(1i8)])
        );
    }
}

//! PackStream encoding: `Value` → bytes.
//!
//! Every encoder picks the smallest marker and length class that holds the
//! value. Sized values are validated before anything is written, so a
//! failed encode leaves the sink exactly as it was.

use bytes::{BufMut, BytesMut};

use crate::error::PackStreamError;
use crate::marker::{self, TINY_INT_MAX, TINY_INT_MIN, TINY_SIZE_MAX};
use crate::types::{Value, ValueMap};

/// Largest byte length or item count of a string, list or map.
pub const MAX_SIZED_LEN: usize = u32::MAX as usize;

/// Largest field count of a structure (there is no 32-bit structure form).
pub const MAX_STRUCT_FIELDS: usize = u16::MAX as usize;

/// Encodes one value into a new buffer.
pub fn pack(value: &Value) -> Result<BytesMut, PackStreamError> {
    let mut buf = BytesMut::new();
    encode_value(&mut buf, value)?;
    Ok(buf)
}

/// Encodes values back to back into a new buffer.
pub fn pack_all(values: &[Value]) -> Result<BytesMut, PackStreamError> {
    values.iter().try_for_each(check_value)?;
    let mut buf = BytesMut::new();
    for value in values {
        put_value(&mut buf, value);
    }
    Ok(buf)
}

/// Encodes a `Value` into the sink using PackStream format.
pub fn encode_value(buf: &mut impl BufMut, value: &Value) -> Result<(), PackStreamError> {
    check_value(value)?;
    put_value(buf, value);
    Ok(())
}

pub fn encode_null(buf: &mut impl BufMut) {
    buf.put_u8(marker::NULL);
}

pub fn encode_bool(buf: &mut impl BufMut, value: bool) {
    buf.put_u8(if value { marker::TRUE } else { marker::FALSE });
}

/// Encodes an integer using the smallest possible PackStream representation.
pub fn encode_int(buf: &mut impl BufMut, value: i64) {
    if (TINY_INT_MIN..=TINY_INT_MAX).contains(&value) {
        // TINY_INT: single byte
        buf.put_u8(value as u8);
    } else if i64::from(i8::MIN) <= value && value <= i64::from(i8::MAX) {
        buf.put_u8(marker::INT_8);
        buf.put_i8(value as i8);
    } else if i64::from(i16::MIN) <= value && value <= i64::from(i16::MAX) {
        buf.put_u8(marker::INT_16);
        buf.put_i16(value as i16);
    } else if i64::from(i32::MIN) <= value && value <= i64::from(i32::MAX) {
        buf.put_u8(marker::INT_32);
        buf.put_i32(value as i32);
    } else {
        buf.put_u8(marker::INT_64);
        buf.put_i64(value);
    }
}

/// Encodes a float as its big-endian IEEE-754 bit pattern.
pub fn encode_float(buf: &mut impl BufMut, value: f64) {
    buf.put_u8(marker::FLOAT_64);
    buf.put_u64(value.to_bits());
}

/// Encodes a string (size = byte length, not char count).
pub fn encode_string(buf: &mut impl BufMut, value: &str) -> Result<(), PackStreamError> {
    check_len("string", value.len(), MAX_SIZED_LEN)?;
    put_string(buf, value);
    Ok(())
}

pub fn encode_list(buf: &mut impl BufMut, items: &[Value]) -> Result<(), PackStreamError> {
    check_list(items)?;
    put_list(buf, items);
    Ok(())
}

pub fn encode_map(buf: &mut impl BufMut, map: &ValueMap) -> Result<(), PackStreamError> {
    check_map(map)?;
    put_map(buf, map);
    Ok(())
}

pub fn encode_structure(
    buf: &mut impl BufMut,
    signature: u8,
    fields: &[Value],
) -> Result<(), PackStreamError> {
    check_structure(fields)?;
    put_struct_header(buf, signature, fields.len());
    for field in fields {
        put_value(buf, field);
    }
    Ok(())
}

/// Encodes a structure header: marker, size prefix and signature byte.
///
/// The caller must follow it with exactly `field_count` encoded values.
pub fn encode_structure_header(
    buf: &mut impl BufMut,
    signature: u8,
    field_count: usize,
) -> Result<(), PackStreamError> {
    check_len("structure", field_count, MAX_STRUCT_FIELDS)?;
    put_struct_header(buf, signature, field_count);
    Ok(())
}

/// Encodes a list header; exactly `len` encoded items must follow.
pub fn encode_list_header(buf: &mut impl BufMut, len: usize) -> Result<(), PackStreamError> {
    check_len("list", len, MAX_SIZED_LEN)?;
    put_sized_header(
        buf,
        len,
        marker::TINY_LIST_NIBBLE,
        [marker::LIST_8, marker::LIST_16, marker::LIST_32],
    );
    Ok(())
}

/// Encodes a map header; exactly `len` key/value pairs must follow.
pub fn encode_map_header(buf: &mut impl BufMut, len: usize) -> Result<(), PackStreamError> {
    check_len("map", len, MAX_SIZED_LEN)?;
    put_sized_header(
        buf,
        len,
        marker::TINY_MAP_NIBBLE,
        [marker::MAP_8, marker::MAP_16, marker::MAP_32],
    );
    Ok(())
}

// -- Validation --

fn check_len(what: &str, len: usize, max: usize) -> Result<(), PackStreamError> {
    if len > max {
        Err(PackStreamError::ValueTooLarge(format!(
            "{what} size {len} exceeds maximum {max}"
        )))
    } else {
        Ok(())
    }
}

fn check_value(value: &Value) -> Result<(), PackStreamError> {
    match value {
        Value::Null | Value::Boolean(_) | Value::Integer(_) | Value::Float(_) => Ok(()),
        Value::String(s) => check_len("string", s.len(), MAX_SIZED_LEN),
        Value::List(items) => check_list(items),
        Value::Map(map) => check_map(map),
        Value::Structure(s) => check_structure(&s.fields),
    }
}

fn check_list(items: &[Value]) -> Result<(), PackStreamError> {
    check_len("list", items.len(), MAX_SIZED_LEN)?;
    items.iter().try_for_each(check_value)
}

fn check_map(map: &ValueMap) -> Result<(), PackStreamError> {
    check_len("map", map.len(), MAX_SIZED_LEN)?;
    map.iter().try_for_each(|(key, value)| {
        check_len("string", key.len(), MAX_SIZED_LEN)?;
        check_value(value)
    })
}

fn check_structure(fields: &[Value]) -> Result<(), PackStreamError> {
    check_len("structure", fields.len(), MAX_STRUCT_FIELDS)?;
    fields.iter().try_for_each(check_value)
}

// -- Writers (sizes already validated) --

fn put_value(buf: &mut impl BufMut, value: &Value) {
    match value {
        Value::Null => encode_null(buf),
        Value::Boolean(b) => encode_bool(buf, *b),
        Value::Integer(i) => encode_int(buf, *i),
        Value::Float(f) => encode_float(buf, *f),
        Value::String(s) => put_string(buf, s),
        Value::List(items) => put_list(buf, items),
        Value::Map(map) => put_map(buf, map),
        Value::Structure(s) => {
            put_struct_header(buf, s.signature, s.fields.len());
            for field in &s.fields {
                put_value(buf, field);
            }
        }
    }
}

fn put_string(buf: &mut impl BufMut, value: &str) {
    put_sized_header(
        buf,
        value.len(),
        marker::TINY_STRING_NIBBLE,
        [marker::STRING_8, marker::STRING_16, marker::STRING_32],
    );
    buf.put_slice(value.as_bytes());
}

fn put_list(buf: &mut impl BufMut, items: &[Value]) {
    put_sized_header(
        buf,
        items.len(),
        marker::TINY_LIST_NIBBLE,
        [marker::LIST_8, marker::LIST_16, marker::LIST_32],
    );
    for item in items {
        put_value(buf, item);
    }
}

fn put_map(buf: &mut impl BufMut, map: &ValueMap) {
    put_sized_header(
        buf,
        map.len(),
        marker::TINY_MAP_NIBBLE,
        [marker::MAP_8, marker::MAP_16, marker::MAP_32],
    );
    for (key, value) in map {
        put_string(buf, key);
        put_value(buf, value);
    }
}

/// Writes the marker and length prefix for a string, list or map.
/// `wide` holds the 8-, 16- and 32-bit markers of the family.
fn put_sized_header(buf: &mut impl BufMut, len: usize, tiny_nibble: u8, wide: [u8; 3]) {
    if len <= TINY_SIZE_MAX {
        buf.put_u8(tiny_nibble | len as u8);
    } else if len <= 255 {
        buf.put_u8(wide[0]);
        buf.put_u8(len as u8);
    } else if len <= 65535 {
        buf.put_u8(wide[1]);
        buf.put_u16(len as u16);
    } else {
        buf.put_u8(wide[2]);
        buf.put_u32(len as u32);
    }
}

fn put_struct_header(buf: &mut impl BufMut, signature: u8, field_count: usize) {
    if field_count <= TINY_SIZE_MAX {
        buf.put_u8(marker::TINY_STRUCT_NIBBLE | field_count as u8);
    } else if field_count <= 255 {
        buf.put_u8(marker::STRUCT_8);
        buf.put_u8(field_count as u8);
    } else {
        buf.put_u8(marker::STRUCT_16);
        buf.put_u16(field_count as u16);
    }
    buf.put_u8(signature);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Structure;

    fn encoded(value: &Value) -> Vec<u8> {
        pack(value).expect("encode failed").to_vec()
    }

    #[test]
    fn encode_null_marker() {
        let mut buf = BytesMut::new();
        encode_null(&mut buf);
        assert_eq!(&buf[..], &[0xC0]);
    }

    #[test]
    fn encode_booleans() {
        let mut buf = BytesMut::new();
        encode_bool(&mut buf, true);
        encode_bool(&mut buf, false);
        assert_eq!(&buf[..], &[0xC3, 0xC2]);
    }

    #[test]
    fn encode_tiny_int() {
        let mut buf = BytesMut::new();
        encode_int(&mut buf, 0);
        assert_eq!(&buf[..], &[0x00]);

        buf.clear();
        encode_int(&mut buf, 127);
        assert_eq!(&buf[..], &[0x7F]);

        buf.clear();
        encode_int(&mut buf, -1);
        assert_eq!(&buf[..], &[0xFF]);

        buf.clear();
        encode_int(&mut buf, -16);
        assert_eq!(&buf[..], &[0xF0]);
    }

    #[test]
    fn encode_int8() {
        let mut buf = BytesMut::new();
        encode_int(&mut buf, -17);
        assert_eq!(&buf[..], &[marker::INT_8, 0xEF]);

        buf.clear();
        encode_int(&mut buf, -128);
        assert_eq!(&buf[..], &[marker::INT_8, 0x80]);
    }

    #[test]
    fn encode_int16() {
        let mut buf = BytesMut::new();
        encode_int(&mut buf, 128);
        assert_eq!(&buf[..], &[marker::INT_16, 0x00, 0x80]);

        buf.clear();
        encode_int(&mut buf, -129);
        assert_eq!(&buf[..], &[marker::INT_16, 0xFF, 0x7F]);
    }

    #[test]
    fn encode_int32_and_int64() {
        let mut buf = BytesMut::new();
        encode_int(&mut buf, 32768);
        assert_eq!(&buf[..], &[marker::INT_32, 0x00, 0x00, 0x80, 0x00]);

        buf.clear();
        let val = i64::from(i32::MAX) + 1;
        encode_int(&mut buf, val);
        assert_eq!(buf[0], marker::INT_64);
        assert_eq!(&buf[1..], &val.to_be_bytes());
    }

    #[test]
    fn encode_float64() {
        let mut buf = BytesMut::new();
        encode_float(&mut buf, 2.0);
        assert_eq!(&buf[..], &[0xC1, 0x40, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn encode_float_keeps_nan_payload() {
        let bits = 0x7FF8_0000_DEAD_BEEF_u64;
        let mut buf = BytesMut::new();
        encode_float(&mut buf, f64::from_bits(bits));
        assert_eq!(&buf[1..], &bits.to_be_bytes());
    }

    #[test]
    fn encode_strings() {
        assert_eq!(encoded(&Value::from("")), vec![0x80]);
        assert_eq!(encoded(&Value::from("A")), vec![0x81, 0x41]);

        let s = "0123456789abcdef"; // 16 bytes, exceeds tiny
        let bytes = encoded(&Value::from(s));
        assert_eq!(&bytes[..2], &[marker::STRING_8, 16]);
        assert_eq!(&bytes[2..], s.as_bytes());
    }

    #[test]
    fn string_length_is_in_bytes() {
        // 5 chars, 10 bytes
        let bytes = encoded(&Value::from("ÄÖÜäö"));
        assert_eq!(bytes[0], 0x8A);
        assert_eq!(bytes.len(), 11);
    }

    #[test]
    fn string_length_class_boundaries() {
        for (len, marker_byte, header) in [
            (15, 0x8F, 1),
            (16, marker::STRING_8, 2),
            (255, marker::STRING_8, 2),
            (256, marker::STRING_16, 3),
            (65535, marker::STRING_16, 3),
            (65536, marker::STRING_32, 5),
        ] {
            let bytes = encoded(&Value::String("x".repeat(len)));
            assert_eq!(bytes[0], marker_byte, "len {len}");
            assert_eq!(bytes.len(), header + len, "len {len}");
        }
    }

    #[test]
    fn encode_lists() {
        assert_eq!(encoded(&Value::List(vec![])), vec![0x90]);
        let items = vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)];
        assert_eq!(encoded(&Value::List(items)), vec![0x93, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn list_length_class_boundaries() {
        for (len, marker_byte, header) in [
            (15, 0x9F, 1),
            (16, marker::LIST_8, 2),
            (256, marker::LIST_16, 3),
            (65536, marker::LIST_32, 5),
        ] {
            let bytes = encoded(&Value::List(vec![Value::Null; len]));
            assert_eq!(bytes[0], marker_byte, "len {len}");
            assert_eq!(bytes.len(), header + len, "len {len}");
        }
    }

    #[test]
    fn encode_maps() {
        assert_eq!(encoded(&Value::Map(ValueMap::new())), vec![0xA0]);
        let map = ValueMap::from([("a".to_string(), Value::Integer(1))]);
        assert_eq!(encoded(&Value::Map(map)), vec![0xA1, 0x81, 0x61, 0x01]);

        let big: ValueMap = (0..16).map(|i| (i.to_string(), Value::Null)).collect();
        assert_eq!(encoded(&Value::Map(big))[..2], [marker::MAP_8, 16]);
    }

    #[test]
    fn encode_structures() {
        let empty = Value::Structure(Structure::new(42, vec![]));
        assert_eq!(encoded(&empty), vec![0xB0, 0x2A]);

        let three = Structure::new(42, vec![1i8.into(), 2i8.into(), 3i8.into()]);
        assert_eq!(encoded(&three.into()), vec![0xB3, 0x2A, 0x01, 0x02, 0x03]);

        let forty = Structure::new(42, (1..=40i64).map(Value::from).collect::<Vec<_>>());
        let bytes = encoded(&forty.into());
        assert_eq!(&bytes[..3], &[marker::STRUCT_8, 0x28, 0x2A]);
        assert_eq!(bytes.len(), 43);
    }

    #[test]
    fn encode_heterogeneous_structure() {
        let s = Structure::new(42, vec![1i8.into(), 2.0f64.into(), "three".into()]);
        assert_eq!(
            encoded(&s.into()),
            vec![
                0xB3, 0x2A, 0x01, 0xC1, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x85,
                0x74, 0x68, 0x72, 0x65, 0x65,
            ]
        );
    }

    #[test]
    fn oversized_structure_leaves_sink_untouched() {
        let mut buf = BytesMut::from(&[0xAB][..]);
        let fields = vec![Value::Null; MAX_STRUCT_FIELDS + 1];
        let err = encode_structure(&mut buf, 1, &fields).unwrap_err();
        assert!(matches!(err, PackStreamError::ValueTooLarge(_)));
        assert_eq!(&buf[..], &[0xAB]);
    }

    #[test]
    fn nested_oversized_structure_fails_before_writing() {
        let inner = Structure::new(1, vec![Value::Null; MAX_STRUCT_FIELDS + 1]);
        let outer = Value::List(vec![Value::Integer(1), inner.into()]);
        let mut buf = Vec::new();
        assert!(encode_value(&mut buf, &outer).is_err());
        assert!(buf.is_empty());
        assert!(encode_structure_header(&mut buf, 1, MAX_STRUCT_FIELDS + 1).is_err());
    }

    #[test]
    fn structure_header_alone() {
        let mut buf = Vec::new();
        encode_structure_header(&mut buf, 0x70, 1).unwrap();
        encode_int(&mut buf, 5);
        assert_eq!(buf, vec![0xB1, 0x70, 0x05]);
    }

    #[test]
    fn list_and_map_headers() {
        let mut buf = Vec::new();
        encode_list_header(&mut buf, 2).unwrap();
        encode_map_header(&mut buf, 0).unwrap();
        encode_list_header(&mut buf, 300).unwrap();
        encode_map_header(&mut buf, 16).unwrap();
        assert_eq!(buf, vec![0x92, 0xA0, 0xD5, 0x01, 0x2C, 0xD8, 0x10]);
    }

    #[test]
    fn pack_all_concatenates() {
        let values = [Value::Null, Value::Boolean(true), Value::Integer(200)];
        let bytes = pack_all(&values).unwrap();
        assert_eq!(&bytes[..], &[0xC0, 0xC3, marker::INT_16, 0x00, 0xC8]);
    }
}

//! Exact-window decoding of null, boolean, integer, float and string.
//!
//! Each decoder takes a window holding exactly one encoded value: a window
//! of the wrong size fails with `WrongLength`, an unexpected leading byte
//! with `WrongMarker`.

use bytes::Buf;

use super::header::Header;
use crate::error::PackStreamError;
use crate::marker::{self, Marker, ValueType};
use crate::types::Value;

pub fn decode_null(window: &[u8]) -> Result<(), PackStreamError> {
    match window {
        [marker::NULL] => Ok(()),
        [other] => Err(PackStreamError::WrongMarker(*other)),
        _ => Err(PackStreamError::wrong_length("null", 1, window.len())),
    }
}

pub fn decode_bool(window: &[u8]) -> Result<bool, PackStreamError> {
    match window {
        [marker::TRUE] => Ok(true),
        [marker::FALSE] => Ok(false),
        [other] => Err(PackStreamError::WrongMarker(*other)),
        _ => Err(PackStreamError::wrong_length("boolean", 1, window.len())),
    }
}

/// Decodes an integer of any width.
///
/// The window size selects the form (1, 2, 3, 5 or 9 bytes) and the marker
/// must agree with it.
pub fn decode_int(window: &[u8]) -> Result<i64, PackStreamError> {
    let Some((&first, payload)) = window.split_first() else {
        return Err(PackStreamError::wrong_length("integer", 1, 0));
    };
    let expected = match window.len() {
        1 => {
            return match Marker::classify(first) {
                Ok(Marker::TinyInt(v)) => Ok(i64::from(v)),
                _ => Err(PackStreamError::WrongMarker(first)),
            };
        }
        2 => marker::INT_8,
        3 => marker::INT_16,
        5 => marker::INT_32,
        9 => marker::INT_64,
        n => {
            return Err(PackStreamError::WrongLength(format!(
                "no integer encoding is {n} bytes long"
            )));
        }
    };
    if first != expected {
        return Err(PackStreamError::WrongMarker(first));
    }

    let mut payload = payload;
    Ok(match payload.len() {
        1 => i64::from(payload.get_i8()),
        2 => i64::from(payload.get_i16()),
        4 => i64::from(payload.get_i32()),
        _ => payload.get_i64(),
    })
}

/// Decodes a float from its big-endian bit pattern; NaN payloads survive.
pub fn decode_float(window: &[u8]) -> Result<f64, PackStreamError> {
    if window.len() != 9 {
        return Err(PackStreamError::wrong_length("float", 9, window.len()));
    }
    if window[0] != marker::FLOAT_64 {
        return Err(PackStreamError::WrongMarker(window[0]));
    }
    let mut payload = &window[1..];
    Ok(f64::from_bits(payload.get_u64()))
}

pub fn decode_string(window: &[u8]) -> Result<String, PackStreamError> {
    let header = Header::read_exact(window, ValueType::String)?;
    let total = header.len.saturating_add(header.size);
    if window.len() != total {
        return Err(PackStreamError::wrong_length("string", total, window.len()));
    }
    std::str::from_utf8(&window[header.len..])
        .map(str::to_owned)
        .map_err(|e| PackStreamError::InvalidValue(format!("invalid UTF-8 string: {e}")))
}

/// Decodes whichever fixed-width scalar the leading byte names.
pub(crate) fn decode_scalar(window: &[u8]) -> Result<Value, PackStreamError> {
    let Some(&first) = window.first() else {
        return Err(PackStreamError::wrong_length("scalar", 1, 0));
    };
    match Marker::classify(first)?.value_type() {
        ValueType::Null => decode_null(window).map(|()| Value::Null),
        ValueType::Boolean => decode_bool(window).map(Value::Boolean),
        ValueType::Integer => decode_int(window).map(Value::Integer),
        ValueType::Float => decode_float(window).map(Value::Float),
        _ => Err(PackStreamError::WrongMarker(first)),
    }
}

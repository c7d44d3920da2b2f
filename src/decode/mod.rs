//! PackStream decoding: bytes → `Value`.
//!
//! [`Unpacker`] is the dispatcher. It reads the leading marker of a window,
//! works out how many bytes the value occupies and hands it to the matching
//! codec. Containers call back into the dispatcher for every child, so the
//! same walk decodes a top-level stream and a deeply nested field.

mod container;
mod header;
pub mod scalar;

use header::Header;

use crate::error::PackStreamError;
use crate::marker::{Marker, ValueType};
use crate::types::Value;

/// Default limit on nested list, map and structure levels.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configurable decoder.
///
/// ```
/// use packstream::Unpacker;
///
/// let unpacker = Unpacker::new().max_depth(8);
/// let (value, used) = unpacker.unpack_one(&[0x91, 0x01, 0xFF]).unwrap();
/// assert_eq!(value, packstream::Value::List(vec![1i64.into()]));
/// assert_eq!(used, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unpacker {
    max_depth: usize,
}

impl Default for Unpacker {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Unpacker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum container nesting depth. A top-level list is depth 1;
    /// with a limit of 0 only scalars and strings decode.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Decodes the value at the start of `window` and returns it together
    /// with the number of bytes it occupied. Trailing bytes are left alone.
    pub fn unpack_one(&self, window: &[u8]) -> Result<(Value, usize), PackStreamError> {
        self.decode_at(window, 0)
    }

    /// Decodes a window that holds exactly one value.
    pub fn unpack(&self, window: &[u8]) -> Result<Value, PackStreamError> {
        let Some(&first) = window.first() else {
            return Err(PackStreamError::wrong_length("value", 1, 0));
        };
        match Marker::classify(first)?.value_type() {
            ValueType::Null | ValueType::Boolean | ValueType::Integer | ValueType::Float => {
                scalar::decode_scalar(window)
            }
            ValueType::String => scalar::decode_string(window).map(Value::String),
            ValueType::List => self.decode_list(window).map(Value::List),
            ValueType::Map => self.decode_map(window).map(Value::Map),
            ValueType::Structure => self.decode_structure(window).map(Value::Structure),
            ValueType::Bytes => Err(unsupported(first)),
        }
    }

    /// Decodes a stream of back-to-back values until the input is used up.
    pub fn unpack_all(&self, bytes: &[u8]) -> Result<Vec<Value>, PackStreamError> {
        let mut values = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let (value, used) = self.decode_at(&bytes[offset..], 0).inspect_err(|e| {
                tracing::debug!(offset, error = %e, "failed to decode value in stream");
            })?;
            tracing::trace!(offset, used, "decoded value");
            values.push(value);
            offset += used;
        }
        Ok(values)
    }

    /// Returns how many bytes the value at the start of `window` occupies,
    /// without building it.
    pub fn probe_len(&self, window: &[u8]) -> Result<usize, PackStreamError> {
        self.skip_at(window, 0)
    }

    /// `depth` is the nesting level of the container holding this value.
    fn decode_at(&self, window: &[u8], depth: usize) -> Result<(Value, usize), PackStreamError> {
        let first = *window.first().ok_or(PackStreamError::underflow(1, 0))?;
        let marker = Marker::classify(first)?;
        if let Some(len) = marker.fixed_len() {
            let value = scalar::decode_scalar(take(window, len)?)?;
            return Ok((value, len));
        }

        match marker.value_type() {
            ValueType::String => {
                let header = Header::read(window, ValueType::String)?;
                let len = header.len.saturating_add(header.size);
                let s = scalar::decode_string(take(window, len)?)?;
                Ok((Value::String(s), len))
            }
            ValueType::List => {
                let header = Header::read(window, ValueType::List)?;
                let (items, used) = self.list_body(window, header, depth + 1)?;
                Ok((Value::List(items), used))
            }
            ValueType::Map => {
                let header = Header::read(window, ValueType::Map)?;
                let (map, used) = self.map_body(window, header, depth + 1)?;
                Ok((Value::Map(map), used))
            }
            ValueType::Structure => {
                let header = Header::read(window, ValueType::Structure)?;
                let (s, used) = self.structure_body(window, header, depth + 1)?;
                Ok((Value::Structure(s), used))
            }
            _ => Err(unsupported(first)),
        }
    }

    fn skip_at(&self, window: &[u8], depth: usize) -> Result<usize, PackStreamError> {
        let first = *window.first().ok_or(PackStreamError::underflow(1, 0))?;
        let marker = Marker::classify(first)?;
        if let Some(len) = marker.fixed_len() {
            take(window, len)?;
            return Ok(len);
        }

        match marker.value_type() {
            ValueType::String => {
                let header = Header::read(window, ValueType::String)?;
                let len = header.len.saturating_add(header.size);
                take(window, len)?;
                Ok(len)
            }
            t @ (ValueType::List | ValueType::Map | ValueType::Structure) => {
                self.probe_container(window, t, depth + 1)
            }
            _ => Err(unsupported(first)),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), PackStreamError> {
        if depth > self.max_depth {
            tracing::debug!(depth, limit = self.max_depth, "nesting depth limit exceeded");
            return Err(PackStreamError::DepthLimitExceeded(self.max_depth));
        }
        Ok(())
    }
}

fn take(window: &[u8], len: usize) -> Result<&[u8], PackStreamError> {
    window
        .get(..len)
        .ok_or(PackStreamError::underflow(len, window.len()))
}

fn unsupported(marker: u8) -> PackStreamError {
    tracing::debug!(marker, "byte array marker is not supported");
    PackStreamError::Unsupported(format!("byte array (marker 0x{marker:02X})"))
}

/// Decodes a window that holds exactly one value.
pub fn unpack(window: &[u8]) -> Result<Value, PackStreamError> {
    Unpacker::default().unpack(window)
}

/// Decodes the leading value of `window`, returning it and its byte length.
pub fn unpack_one(window: &[u8]) -> Result<(Value, usize), PackStreamError> {
    Unpacker::default().unpack_one(window)
}

/// Decodes back-to-back values until `bytes` is used up.
pub fn unpack_all(bytes: &[u8]) -> Result<Vec<Value>, PackStreamError> {
    Unpacker::default().unpack_all(bytes)
}

/// Returns the byte length of the leading value of `window`.
pub fn probe_len(window: &[u8]) -> Result<usize, PackStreamError> {
    Unpacker::default().probe_len(window)
}

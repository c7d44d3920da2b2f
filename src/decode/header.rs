//! Marker and length prefix of strings, lists, maps and structures.

use bytes::Buf;

use crate::error::PackStreamError;
use crate::marker::{Marker, SizeClass, ValueType};

/// The marker and length prefix at the start of a sized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub marker: Marker,
    /// Bytes taken by the marker plus its length prefix.
    pub len: usize,
    /// Byte length for strings, item count for lists, maps and structures.
    pub size: usize,
}

impl Header {
    /// Reads the header of a value of type `expected` at the start of `window`.
    ///
    /// A window that ends inside the length prefix is a buffer underflow.
    pub fn read(window: &[u8], expected: ValueType) -> Result<Self, PackStreamError> {
        let (&first, rest) = window
            .split_first()
            .ok_or(PackStreamError::underflow(1, 0))?;
        let marker = Marker::classify(first)?;
        if marker.value_type() != expected {
            return Err(PackStreamError::WrongMarker(first));
        }
        let class = marker
            .size_class()
            .ok_or(PackStreamError::WrongMarker(first))?;

        let prefix_len = class.prefix_len();
        if rest.len() < prefix_len {
            return Err(PackStreamError::underflow(1 + prefix_len, window.len()));
        }
        let mut prefix = &rest[..prefix_len];
        let size = match class {
            SizeClass::Tiny(n) => usize::from(n),
            SizeClass::U8 => usize::from(prefix.get_u8()),
            SizeClass::U16 => usize::from(prefix.get_u16()),
            SizeClass::U32 => prefix.get_u32() as usize,
        };

        Ok(Self {
            marker,
            len: 1 + prefix_len,
            size,
        })
    }

    /// Like [`read`](Self::read), for a window that must hold the whole value:
    /// running out of bytes is a length mismatch, not an underflow.
    pub fn read_exact(window: &[u8], expected: ValueType) -> Result<Self, PackStreamError> {
        Self::read(window, expected).map_err(|e| match e {
            PackStreamError::BufferUnderflow { needed, available } => {
                PackStreamError::wrong_length("header", needed, available)
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_header() {
        let h = Header::read(&[0x93, 0x01], ValueType::List).unwrap();
        assert_eq!(h.marker, Marker::TinyList(3));
        assert_eq!((h.len, h.size), (1, 3));
    }

    #[test]
    fn wide_headers_are_big_endian() {
        let h = Header::read(&[0xD0, 0x10], ValueType::String).unwrap();
        assert_eq!((h.len, h.size), (2, 16));

        let h = Header::read(&[0xD9, 0x01, 0x00], ValueType::Map).unwrap();
        assert_eq!((h.len, h.size), (3, 256));

        let h = Header::read(&[0xD6, 0x00, 0x01, 0x00, 0x00], ValueType::List).unwrap();
        assert_eq!((h.len, h.size), (5, 65536));

        let h = Header::read(&[0xDD, 0x01, 0x00, 0x2A], ValueType::Structure).unwrap();
        assert_eq!((h.len, h.size), (3, 256));
    }

    #[test]
    fn wrong_family_is_wrong_marker() {
        assert_eq!(
            Header::read(&[0x93], ValueType::Map),
            Err(PackStreamError::WrongMarker(0x93))
        );
        assert_eq!(
            Header::read(&[0xC4], ValueType::List),
            Err(PackStreamError::WrongMarker(0xC4))
        );
    }

    #[test]
    fn truncated_prefix() {
        assert_eq!(
            Header::read(&[0xD1, 0x01], ValueType::String),
            Err(PackStreamError::underflow(3, 2))
        );
        assert_eq!(
            Header::read(&[], ValueType::String),
            Err(PackStreamError::underflow(1, 0))
        );
        assert!(matches!(
            Header::read_exact(&[0xD1, 0x01], ValueType::String),
            Err(PackStreamError::WrongLength(_))
        ));
    }
}

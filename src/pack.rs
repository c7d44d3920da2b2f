//! Per-type codecs.
//!
//! [`PackStream`] is implemented by every Rust type that maps onto a single
//! wire type, so callers that know what they expect can skip `Value`.

use std::collections::HashMap;

use bytes::{BufMut, BytesMut};

use crate::decode::{self, scalar};
use crate::encode;
use crate::error::PackStreamError;
use crate::types::{Null, Structure, Value};

/// A type with its own PackStream encoding.
pub trait PackStream: Sized {
    /// Appends the encoding of `self` to the sink.
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError>;

    /// Decodes a window that holds exactly one encoded value of this type.
    fn unpack(window: &[u8]) -> Result<Self, PackStreamError>;

    fn pack(&self) -> Result<BytesMut, PackStreamError> {
        let mut buf = BytesMut::new();
        self.pack_into(&mut buf)?;
        Ok(buf)
    }
}

impl PackStream for Null {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        encode::encode_null(buf);
        Ok(())
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        scalar::decode_null(window).map(|()| Null)
    }
}

impl PackStream for bool {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        encode::encode_bool(buf, *self);
        Ok(())
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        scalar::decode_bool(window)
    }
}

impl PackStream for i64 {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        encode::encode_int(buf, *self);
        Ok(())
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        scalar::decode_int(window)
    }
}

/// Narrow integers encode canonically and accept any wire width on decode,
/// as long as the value fits.
macro_rules! narrow_int {
    ($($t:ty),*) => {
        $(
            impl PackStream for $t {
                fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
                    encode::encode_int(buf, i64::from(*self));
                    Ok(())
                }

                fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
                    let value = scalar::decode_int(window)?;
                    <$t>::try_from(value).map_err(|_| {
                        PackStreamError::InvalidValue(format!(
                            "{value} is out of range for {}",
                            stringify!($t)
                        ))
                    })
                }
            }
        )*
    };
}

narrow_int!(i8, i16, i32);

impl PackStream for f64 {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        encode::encode_float(buf, *self);
        Ok(())
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        scalar::decode_float(window)
    }
}

impl PackStream for String {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        encode::encode_string(buf, self)
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        scalar::decode_string(window)
    }
}

/// Lists of any packable element type. Items are encoded into a scratch
/// buffer first so a failing item leaves the sink untouched.
impl<T: PackStream> PackStream for Vec<T> {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        let mut body = BytesMut::new();
        encode::encode_list_header(&mut body, self.len())?;
        for item in self {
            item.pack_into(&mut body)?;
        }
        buf.put_slice(&body);
        Ok(())
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        decode::Unpacker::default()
            .list_windows(window)?
            .into_iter()
            .map(T::unpack)
            .collect()
    }
}

/// String-keyed maps of any packable value type. Duplicate keys keep the
/// last value.
impl<T: PackStream> PackStream for HashMap<String, T> {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        let mut body = BytesMut::new();
        encode::encode_map_header(&mut body, self.len())?;
        for (key, value) in self {
            encode::encode_string(&mut body, key)?;
            value.pack_into(&mut body)?;
        }
        buf.put_slice(&body);
        Ok(())
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        let entries = decode::Unpacker::default().map_windows(window)?;
        let mut map = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            let key = String::unpack(key)?;
            let value = T::unpack(value)?;
            if map.contains_key(&key) {
                tracing::debug!(%key, "duplicate map key, keeping last value");
            }
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl PackStream for Structure {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        encode::encode_structure(buf, self.signature, &self.fields)
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        decode::Unpacker::default().decode_structure(window)
    }
}

impl PackStream for Value {
    fn pack_into(&self, buf: &mut impl BufMut) -> Result<(), PackStreamError> {
        encode::encode_value(buf, self)
    }

    fn unpack(window: &[u8]) -> Result<Self, PackStreamError> {
        decode::unpack(window)
    }
}

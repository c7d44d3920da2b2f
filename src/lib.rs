//! packstream — a pure-Rust PackStream binary serialization codec.
//!
//! PackStream is the compact, self-describing value format carried by the
//! Bolt graph database protocol. Every value starts with a one-byte marker
//! that names its type and, for small values, its size or the value itself.
//! Multi-byte integers and length prefixes are big-endian.
//!
//! # Architecture
//!
//! - **`marker`** — Marker byte table and classification
//! - **`encode`** — `Value` → bytes, always in the smallest encoding
//! - **`decode`** — bytes → `Value`: exact-window codecs and the `Unpacker` dispatcher
//! - **`pack`** — `PackStream` trait for typed packing and unpacking
//! - **`types`** — The `Value` model and conversions
//!
//! ```
//! use packstream::{Structure, Value};
//!
//! let node = Value::Structure(Structure::new(0x4E, vec![Value::from(1i64)]));
//! let bytes = packstream::pack(&node).unwrap();
//! assert_eq!(&bytes[..], &[0xB1, 0x4E, 0x01]);
//! assert_eq!(packstream::unpack(&bytes).unwrap(), node);
//! ```

pub mod decode;
pub mod encode;
pub mod error;
pub mod marker;
pub mod pack;
pub mod types;

pub use decode::{DEFAULT_MAX_DEPTH, Unpacker, probe_len, unpack, unpack_all, unpack_one};
pub use encode::{encode_value, pack, pack_all};
pub use error::PackStreamError;
pub use marker::{Marker, UnknownMarker, ValueType};
pub use pack::PackStream;
pub use types::{Null, Structure, Value, ValueMap};

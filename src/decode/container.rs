//! List, map and structure decoding.
//!
//! Containers hand every child to the dispatcher, which reports how many
//! bytes the child used; the running total is the container's own length.
//! Probing walks the same headers and children without building values.

use super::Unpacker;
use super::header::Header;
use crate::error::PackStreamError;
use crate::marker::{Marker, ValueType};
use crate::types::{Structure, Value, ValueMap};

impl Unpacker {
    /// Decodes a window that holds exactly one list.
    pub fn decode_list(&self, window: &[u8]) -> Result<Vec<Value>, PackStreamError> {
        let header = Header::read_exact(window, ValueType::List)?;
        let (items, used) = self.list_body(window, header, 1)?;
        expect_consumed("list", used, window.len())?;
        Ok(items)
    }

    /// Decodes a window that holds exactly one map.
    pub fn decode_map(&self, window: &[u8]) -> Result<ValueMap, PackStreamError> {
        let header = Header::read_exact(window, ValueType::Map)?;
        let (map, used) = self.map_body(window, header, 1)?;
        expect_consumed("map", used, window.len())?;
        Ok(map)
    }

    /// Decodes a window that holds exactly one structure.
    pub fn decode_structure(&self, window: &[u8]) -> Result<Structure, PackStreamError> {
        let header = Header::read_exact(window, ValueType::Structure)?;
        // Signature byte is mandatory, even with zero fields.
        if window.len() <= header.len {
            return Err(PackStreamError::wrong_length(
                "structure",
                header.len + 1,
                window.len(),
            ));
        }
        let (structure, used) = self.structure_body(window, header, 1)?;
        expect_consumed("structure", used, window.len())?;
        Ok(structure)
    }

    /// Returns the encoded length of the list at the start of `window`.
    pub fn probe_list(&self, window: &[u8]) -> Result<usize, PackStreamError> {
        self.probe_container(window, ValueType::List, 1)
    }

    /// Returns the encoded length of the map at the start of `window`.
    pub fn probe_map(&self, window: &[u8]) -> Result<usize, PackStreamError> {
        self.probe_container(window, ValueType::Map, 1)
    }

    /// Returns the encoded length of the structure at the start of `window`.
    pub fn probe_structure(&self, window: &[u8]) -> Result<usize, PackStreamError> {
        self.probe_container(window, ValueType::Structure, 1)
    }

    pub(super) fn list_body(
        &self,
        window: &[u8],
        header: Header,
        depth: usize,
    ) -> Result<(Vec<Value>, usize), PackStreamError> {
        self.check_depth(depth)?;
        let mut pos = header.len;
        // Every item takes at least one byte; don't trust the count for capacity.
        let mut items = Vec::with_capacity(header.size.min(window.len() - pos));
        for _ in 0..header.size {
            let (item, used) = self.decode_at(&window[pos..], depth)?;
            items.push(item);
            pos += used;
        }
        Ok((items, pos))
    }

    pub(super) fn map_body(
        &self,
        window: &[u8],
        header: Header,
        depth: usize,
    ) -> Result<(ValueMap, usize), PackStreamError> {
        self.check_depth(depth)?;
        let mut pos = header.len;
        let mut map = ValueMap::with_capacity(header.size.min((window.len() - pos) / 2));
        for _ in 0..header.size {
            let (key, used) = self.decode_at(&window[pos..], depth)?;
            pos += used;
            let key = match key {
                Value::String(s) => s,
                other => {
                    return Err(PackStreamError::InvalidValue(format!(
                        "map key must be a string, got: {other}"
                    )));
                }
            };

            let (value, used) = self.decode_at(&window[pos..], depth)?;
            pos += used;

            if map.contains_key(&key) {
                tracing::debug!(%key, "duplicate map key, keeping last value");
            }
            map.insert(key, value);
        }
        Ok((map, pos))
    }

    pub(super) fn structure_body(
        &self,
        window: &[u8],
        header: Header,
        depth: usize,
    ) -> Result<(Structure, usize), PackStreamError> {
        self.check_depth(depth)?;
        let signature = *window
            .get(header.len)
            .ok_or(PackStreamError::underflow(header.len + 1, window.len()))?;
        let mut pos = header.len + 1;
        let mut fields = Vec::with_capacity(header.size.min(window.len() - pos));
        for _ in 0..header.size {
            let (field, used) = self.decode_at(&window[pos..], depth)?;
            fields.push(field);
            pos += used;
        }
        Ok((Structure { signature, fields }, pos))
    }

    /// Walks a container's children without building them.
    pub(super) fn probe_container(
        &self,
        window: &[u8],
        expected: ValueType,
        depth: usize,
    ) -> Result<usize, PackStreamError> {
        let header = Header::read(window, expected)?;
        self.check_depth(depth)?;
        let is_map = header.marker.value_type() == ValueType::Map;
        let (start, children) = match header.marker.value_type() {
            ValueType::Map => (header.len, header.size.saturating_mul(2)),
            ValueType::Structure => {
                if window.len() <= header.len {
                    return Err(PackStreamError::underflow(header.len + 1, window.len()));
                }
                (header.len + 1, header.size)
            }
            _ => (header.len, header.size),
        };

        let mut pos = start;
        for i in 0..children {
            if is_map && i % 2 == 0 {
                check_key(&window[pos..])?;
            }
            pos += self.skip_at(&window[pos..], depth)?;
        }
        Ok(pos)
    }

    /// Splits a window holding exactly one list into the windows of its items.
    pub(crate) fn list_windows<'a>(
        &self,
        window: &'a [u8],
    ) -> Result<Vec<&'a [u8]>, PackStreamError> {
        let header = Header::read_exact(window, ValueType::List)?;
        self.check_depth(1)?;
        let mut pos = header.len;
        let mut items = Vec::with_capacity(header.size.min(window.len() - pos));
        for _ in 0..header.size {
            let used = self.skip_at(&window[pos..], 1)?;
            items.push(&window[pos..pos + used]);
            pos += used;
        }
        expect_consumed("list", pos, window.len())?;
        Ok(items)
    }

    /// Splits a window holding exactly one map into key and value windows.
    /// Every key window is checked to hold a string.
    pub(crate) fn map_windows<'a>(
        &self,
        window: &'a [u8],
    ) -> Result<Vec<(&'a [u8], &'a [u8])>, PackStreamError> {
        let header = Header::read_exact(window, ValueType::Map)?;
        self.check_depth(1)?;
        let mut pos = header.len;
        let mut entries = Vec::with_capacity(header.size.min((window.len() - pos) / 2));
        for _ in 0..header.size {
            check_key(&window[pos..])?;
            let key_len = self.skip_at(&window[pos..], 1)?;
            let key = &window[pos..pos + key_len];
            pos += key_len;

            let value_len = self.skip_at(&window[pos..], 1)?;
            entries.push((key, &window[pos..pos + value_len]));
            pos += value_len;
        }
        expect_consumed("map", pos, window.len())?;
        Ok(entries)
    }
}

/// Map keys must be strings; only the leading marker is inspected.
fn check_key(window: &[u8]) -> Result<(), PackStreamError> {
    let first = *window.first().ok_or(PackStreamError::underflow(1, 0))?;
    match Marker::classify(first)?.value_type() {
        ValueType::String => Ok(()),
        other => Err(PackStreamError::InvalidValue(format!(
            "map key must be a string, got {other:?} (marker 0x{first:02X})"
        ))),
    }
}

fn expect_consumed(what: &str, used: usize, available: usize) -> Result<(), PackStreamError> {
    if used == available {
        Ok(())
    } else {
        Err(PackStreamError::wrong_length(what, used, available))
    }
}

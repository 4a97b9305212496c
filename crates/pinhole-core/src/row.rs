use crate::error::{Result, StoreError};
use std::collections::BTreeMap;

/// A single row read from a column-family table.
///
/// Holds the row key and the qualifier-to-value map of one column family.
/// Qualifiers iterate in ascending byte order, matching the column order
/// a family scan returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    key: Vec<u8>,
    columns: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Row {
    pub fn new(key: Vec<u8>, columns: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self { key, columns }
    }

    /// Returns the row key as raw bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Returns the row key decoded as UTF-8.
    pub fn key_utf8(&self) -> Result<&str> {
        decode_utf8(&self.key)
    }

    /// Returns the value of the given column, if present.
    pub fn value(&self, qualifier: &[u8]) -> Option<&[u8]> {
        self.columns.get(qualifier).map(Vec::as_slice)
    }

    /// Iterates over the column qualifiers in ascending byte order.
    pub fn qualifiers(&self) -> impl Iterator<Item = &[u8]> {
        self.columns.keys().map(Vec::as_slice)
    }

    /// Returns the full qualifier-to-value map.
    pub fn columns(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.columns
    }
}

/// Decodes raw store bytes as UTF-8, mapping failures to [`StoreError::InvalidData`].
pub fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        StoreError::InvalidData(format!("expected utf-8 bytes, got {:?}: {}", bytes, e))
    })
}

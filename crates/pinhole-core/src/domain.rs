use crate::error::{Result, StoreError};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A short domain together with every long domain registered under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortDomain {
    /// The short domain (row key of the short-domain table).
    pub short_domain: String,
    /// The long domains registered under it, in ascending column order.
    pub long_domains: Vec<String>,
}

impl ShortDomain {
    pub fn new(short_domain: impl Into<String>, long_domains: Vec<String>) -> Self {
        Self {
            short_domain: short_domain.into(),
            long_domains,
        }
    }
}

/// Encodes a registration timestamp as the cell value stored next to a
/// long-domain column: big-endian milliseconds since the Unix epoch.
pub fn encode_registered_at(ts: Timestamp) -> [u8; 8] {
    ts.as_millisecond().to_be_bytes()
}

/// Decodes a registration timestamp written by [`encode_registered_at`].
pub fn decode_registered_at(bytes: &[u8]) -> Result<Timestamp> {
    let raw: [u8; 8] = bytes.try_into().map_err(|_| {
        StoreError::InvalidData(format!(
            "registration timestamp must be 8 bytes, got {}",
            bytes.len()
        ))
    })?;
    Timestamp::from_millisecond(i64::from_be_bytes(raw))
        .map_err(|e| StoreError::InvalidData(format!("invalid registration timestamp: {e}")))
}

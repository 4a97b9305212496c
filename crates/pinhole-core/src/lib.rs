//! Core types and traits for the Pinhole domain mapping service.
//!
//! This crate provides the column-family store contract and the shared
//! types used by the store backends and the domain mapping service.

pub mod domain;
pub mod error;
pub mod row;
pub mod store;
pub mod table;

pub use domain::{decode_registered_at, encode_registered_at, ShortDomain};
pub use error::{Result, StoreError};
pub use row::{decode_utf8, Row};
pub use store::ColumnStore;
pub use table::{
    TableName, DATA_FAMILY, DOMAINS_FAMILY, LONG_DOMAIN_TABLE, SHORT_DOMAIN_QUALIFIER,
    SHORT_DOMAIN_TABLE,
};

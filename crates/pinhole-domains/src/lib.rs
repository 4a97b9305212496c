//! Domain mapping service.
//!
//! This crate implements the short-domain to long-domain mapping on top
//! of the column-family store contract from `pinhole_core`. The two
//! tables it maintains are two physical records of one logical
//! bidirectional relation; keeping them synchronized is this service's
//! entire responsibility.

pub mod error;
pub mod service;

pub use error::{DomainError, Result};
pub use service::DomainService;

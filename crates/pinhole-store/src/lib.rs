//! Store backends and resource management for the Pinhole domain
//! mapping service.
//!
//! This crate provides two [`ColumnStore`](pinhole_core::ColumnStore)
//! implementations (in-memory and Redis-backed) and the
//! [`ResourceManager`], which lends table-scoped leases and guarantees
//! their return on every exit path.

pub mod manager;
pub mod memory;
pub mod redis;

pub use manager::{ResourceManager, TableLease, DEFAULT_LEASE_POOL_SIZE};
pub use memory::InMemoryStore;
pub use self::redis::RedisStore;

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::{Display, Formatter};

pub const STORE_BACKEND_ENV: &str = "PINHOLE_STORE_BACKEND";
pub const REDIS_URL_ENV: &str = "PINHOLE_REDIS_URL";
pub const LEASE_POOL_SIZE_ENV: &str = "PINHOLE_LEASE_POOL_SIZE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackendArg {
    /// Per-process store, useful for smoke tests only.
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StoreBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackendArg::InMemory => write!(f, "in-memory"),
            StoreBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pinhole-admin")]
pub struct CLI {
    #[arg(
        long,
        env = STORE_BACKEND_ENV,
        value_enum,
        default_value_t = StoreBackendArg::InMemory
    )]
    pub store: StoreBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("store", "redis"))]
    pub redis_url: Option<String>,

    #[arg(
        long,
        env = LEASE_POOL_SIZE_ENV,
        default_value_t = pinhole_store::DEFAULT_LEASE_POOL_SIZE
    )]
    pub lease_pool_size: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register a long domain under a short domain.
    Add {
        short_domain: String,
        long_domain: String,
    },
    /// Remove a single long-domain mapping.
    RmLong { long_domain: String },
    /// Remove a short domain and every long domain it owns.
    RmShort { short_domain: String },
    /// Look up the short domain for a long domain.
    Shorten {
        long_domain: String,
        /// Value printed when no mapping exists.
        #[arg(long, default_value = "-")]
        default: String,
    },
    /// List every short domain with its long domains.
    List,
    /// Seed the tables with the demo data set.
    Seed,
}

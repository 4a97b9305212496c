mod cli;

use crate::cli::{Command, StoreBackendArg, CLI};
use clap::Parser;
use pinhole_core::ColumnStore;
use pinhole_domains::DomainService;
use pinhole_store::{InMemoryStore, RedisStore, ResourceManager};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = CLI::try_parse()?;

    info!(
        store_backend = %config.store,
        lease_pool_size = config.lease_pool_size,
        "starting pinhole admin"
    );

    match config.store {
        StoreBackendArg::InMemory => {
            let rm = ResourceManager::with_pool_size(InMemoryStore::new(), config.lease_pool_size);
            run(DomainService::new(rm), config.command).await
        }
        StoreBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .ok_or_else(|| anyhow::anyhow!("redis url is required when store backend is redis"))?;
            let store = RedisStore::connect(&redis_url).await?;
            let rm = ResourceManager::with_pool_size(store, config.lease_pool_size);
            run(DomainService::new(rm), config.command).await
        }
    }
}

async fn run<S: ColumnStore>(service: DomainService<S>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Add {
            short_domain,
            long_domain,
        } => {
            service.add_long_domain(&short_domain, &long_domain).await?;
            println!("{long_domain} -> {short_domain}");
        }
        Command::RmLong { long_domain } => {
            service.delete_long_domain(&long_domain).await?;
            println!("removed {long_domain}");
        }
        Command::RmShort { short_domain } => {
            service.delete_short_domain(&short_domain).await?;
            println!("removed {short_domain}");
        }
        Command::Shorten {
            long_domain,
            default,
        } => {
            println!("{}", service.shorten(&long_domain, &default).await?);
        }
        Command::List => {
            for domain in service.list_short_domains().await? {
                println!("{}: {}", domain.short_domain, domain.long_domains.join(", "));
            }
        }
        Command::Seed => {
            service.create_domains().await?;
            println!("seeded demo domains");
        }
    }
    Ok(())
}

use crate::error::{DomainError, Result};
use jiff::Timestamp;
use pinhole_core::{
    decode_utf8, encode_registered_at, ColumnStore, Row, ShortDomain, DATA_FAMILY, DOMAINS_FAMILY,
    LONG_DOMAIN_TABLE, SHORT_DOMAIN_QUALIFIER, SHORT_DOMAIN_TABLE,
};
use pinhole_store::ResourceManager;
use tracing::{debug, trace, warn};

/// Maintains the bidirectional short-domain to long-domain mapping.
///
/// Every operation borrows its table leases from the [`ResourceManager`],
/// performs its reads and writes, and releases the leases on every exit
/// path. Cross-table write sequences are not transactional: a failure
/// between the two writes is compensated where possible and reported as
/// [`DomainError::Inconsistent`] where not.
pub struct DomainService<S> {
    rm: ResourceManager<S>,
}

impl<S> Clone for DomainService<S> {
    fn clone(&self) -> Self {
        Self {
            rm: self.rm.clone(),
        }
    }
}

impl<S> std::fmt::Debug for DomainService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainService").finish_non_exhaustive()
    }
}

impl<S: ColumnStore> DomainService<S> {
    pub fn new(rm: ResourceManager<S>) -> Self {
        Self { rm }
    }

    /// Registers `long_domain` under `short_domain`.
    ///
    /// Writes the long domain as a column of the short domain's row (cell
    /// value: registration timestamp), then points the long domain's row
    /// at the short domain. Strings are stored byte-for-byte; no format
    /// validation is performed.
    ///
    /// A long domain belongs to one short domain at a time: when it is
    /// already mapped elsewhere, the previous owner's column is removed
    /// before the new mapping is written.
    pub async fn add_long_domain(&self, short_domain: &str, long_domain: &str) -> Result<()> {
        let short_table = self.rm.table(SHORT_DOMAIN_TABLE).await?;
        let long_table = self.rm.table(LONG_DOMAIN_TABLE).await?;

        let short_bytes = short_domain.as_bytes();
        let long_bytes = long_domain.as_bytes();

        if let Some(row) = long_table.get(long_bytes, DATA_FAMILY).await? {
            if let Some(owner) = row.value(SHORT_DOMAIN_QUALIFIER) {
                if !owner.is_empty() && owner != short_bytes {
                    warn!(
                        long_domain,
                        previous_owner = %String::from_utf8_lossy(owner),
                        short_domain,
                        "long domain already mapped, moving it"
                    );
                    let owner = owner.to_vec();
                    short_table
                        .delete_cell(&owner, DOMAINS_FAMILY, long_bytes)
                        .await?;
                }
            }
        }

        // First the sdom column, then the ldom pointer.
        let registered_at = encode_registered_at(Timestamp::now());
        short_table
            .put(short_bytes, DOMAINS_FAMILY, long_bytes, &registered_at)
            .await?;

        if let Err(err) = long_table
            .put(long_bytes, DATA_FAMILY, SHORT_DOMAIN_QUALIFIER, short_bytes)
            .await
        {
            warn!(
                short_domain,
                long_domain,
                error = %err,
                "long-domain write failed, compensating short-domain column"
            );
            return match short_table
                .delete_cell(short_bytes, DOMAINS_FAMILY, long_bytes)
                .await
            {
                Ok(()) => Err(err.into()),
                Err(source) => Err(DomainError::Inconsistent {
                    short_domain: short_domain.to_string(),
                    source,
                }),
            };
        }

        debug!(short_domain, long_domain, "added long domain");
        Ok(())
    }

    /// Removes a single long-domain mapping.
    ///
    /// Deletes the long domain's row, then the matching column in the
    /// owning short domain's row. The short domain itself survives, even
    /// when this was its last long domain. Unmapped long domains are a
    /// no-op.
    pub async fn delete_long_domain(&self, long_domain: &str) -> Result<()> {
        let short_table = self.rm.table(SHORT_DOMAIN_TABLE).await?;
        let long_table = self.rm.table(LONG_DOMAIN_TABLE).await?;

        let long_bytes = long_domain.as_bytes();

        let Some(row) = long_table.get(long_bytes, DATA_FAMILY).await? else {
            trace!(long_domain, "long domain not mapped, nothing to delete");
            return Ok(());
        };
        let Some(owner) = row.value(SHORT_DOMAIN_QUALIFIER).map(<[u8]>::to_vec) else {
            trace!(long_domain, "long domain row has no owner column");
            return Ok(());
        };

        long_table.delete_row(long_bytes).await?;
        if let Err(source) = short_table
            .delete_cell(&owner, DOMAINS_FAMILY, long_bytes)
            .await
        {
            return Err(DomainError::Inconsistent {
                short_domain: String::from_utf8_lossy(&owner).into_owned(),
                source,
            });
        }

        debug!(long_domain, "deleted long domain");
        Ok(())
    }

    /// Removes a short domain and every long domain registered under it.
    ///
    /// The long-domain rows are batch-deleted first, then the short
    /// domain's own row. Absent short domains are a no-op.
    pub async fn delete_short_domain(&self, short_domain: &str) -> Result<()> {
        let short_table = self.rm.table(SHORT_DOMAIN_TABLE).await?;
        let long_table = self.rm.table(LONG_DOMAIN_TABLE).await?;

        let short_bytes = short_domain.as_bytes();

        let Some(row) = short_table.get(short_bytes, DOMAINS_FAMILY).await? else {
            trace!(short_domain, "short domain not present, nothing to delete");
            return Ok(());
        };

        let long_keys: Vec<Vec<u8>> = row.qualifiers().map(<[u8]>::to_vec).collect();
        long_table.delete_rows(&long_keys).await?;
        if let Err(source) = short_table.delete_row(short_bytes).await {
            return Err(DomainError::Inconsistent {
                short_domain: short_domain.to_string(),
                source,
            });
        }

        debug!(short_domain, released = long_keys.len(), "deleted short domain");
        Ok(())
    }

    /// Returns the short domain mapped to `long_domain`, or
    /// `default_value` when no (non-empty) mapping exists. Pure read.
    pub async fn shorten(&self, long_domain: &str, default_value: &str) -> Result<String> {
        let long_table = self.rm.table(LONG_DOMAIN_TABLE).await?;

        if let Some(row) = long_table.get(long_domain.as_bytes(), DATA_FAMILY).await? {
            if let Some(short) = row.value(SHORT_DOMAIN_QUALIFIER) {
                if !short.is_empty() {
                    return Ok(decode_utf8(short)?.to_string());
                }
            }
        }
        Ok(default_value.to_string())
    }

    /// Lists every short domain with the long domains registered under
    /// it, ascending by short-domain key.
    pub async fn list_short_domains(&self) -> Result<Vec<ShortDomain>> {
        let short_table = self.rm.table(SHORT_DOMAIN_TABLE).await?;
        let rows = short_table.scan(DOMAINS_FAMILY).await?;

        rows.iter().map(row_to_short_domain).collect()
    }

    /// Seeds the tables with a fixed demo data set.
    pub async fn create_domains(&self) -> Result<()> {
        const SEED: &[(&str, &str)] = &[
            ("oreil.ly", "www.oreilly.com"),
            ("oreil.ly", "www2.oreilly.com"),
            ("oreil.ly", "www.orly.com"),
            ("oreil.ly", "oreilly.co.uk"),
            ("oreil.ly", "asdfasdfasdf.com"),
            ("hba.se", "hbasebook.com"),
            ("hba.se", "whatever.com"),
            ("hba.se", "seeya.com"),
        ];

        for (short_domain, long_domain) in SEED {
            self.add_long_domain(short_domain, long_domain).await?;
        }
        Ok(())
    }
}

fn row_to_short_domain(row: &Row) -> Result<ShortDomain> {
    let short_domain = row.key_utf8()?.to_string();
    let long_domains = row
        .qualifiers()
        .map(|q| decode_utf8(q).map(str::to_string))
        .collect::<pinhole_core::Result<Vec<_>>>()?;
    Ok(ShortDomain::new(short_domain, long_domains))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinhole_store::InMemoryStore;
    use std::collections::BTreeSet;

    fn service() -> DomainService<InMemoryStore> {
        DomainService::new(ResourceManager::new(InMemoryStore::new()))
    }

    fn as_set(domains: &[String]) -> BTreeSet<&str> {
        domains.iter().map(String::as_str).collect()
    }

    async fn find(
        service: &DomainService<InMemoryStore>,
        short_domain: &str,
    ) -> Option<ShortDomain> {
        service
            .list_short_domains()
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.short_domain == short_domain)
    }

    #[tokio::test]
    async fn shorten_returns_mapped_short_domain() {
        let service = service();
        service.add_long_domain("hba.se", "hbasebook.com").await.unwrap();

        assert_eq!(service.shorten("hbasebook.com", "none").await.unwrap(), "hba.se");
        assert_eq!(service.shorten("nope.com", "none").await.unwrap(), "none");
    }

    #[tokio::test]
    async fn add_groups_long_domains_under_short_domain() {
        let service = service();
        service.add_long_domain("oreil.ly", "www.oreilly.com").await.unwrap();
        service.add_long_domain("oreil.ly", "www.orly.com").await.unwrap();

        let domain = find(&service, "oreil.ly").await.expect("oreil.ly listed");
        assert_eq!(
            as_set(&domain.long_domains),
            BTreeSet::from(["www.oreilly.com", "www.orly.com"])
        );
    }

    #[tokio::test]
    async fn delete_long_domain_removes_one_edge() {
        let service = service();
        service.add_long_domain("oreil.ly", "www.oreilly.com").await.unwrap();
        service.add_long_domain("oreil.ly", "www.orly.com").await.unwrap();

        service.delete_long_domain("www.orly.com").await.unwrap();

        assert_eq!(service.shorten("www.orly.com", "none").await.unwrap(), "none");
        assert_eq!(
            service.shorten("www.oreilly.com", "none").await.unwrap(),
            "oreil.ly"
        );

        let domain = find(&service, "oreil.ly").await.expect("oreil.ly listed");
        assert_eq!(as_set(&domain.long_domains), BTreeSet::from(["www.oreilly.com"]));
    }

    #[tokio::test]
    async fn delete_long_domain_unmapped_is_noop() {
        let service = service();
        service.delete_long_domain("nope.com").await.unwrap();
        assert!(service.list_short_domains().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_short_domain_releases_every_long_domain() {
        let service = service();
        service.add_long_domain("hba.se", "hbasebook.com").await.unwrap();
        service.add_long_domain("hba.se", "whatever.com").await.unwrap();

        service.delete_short_domain("hba.se").await.unwrap();

        assert!(find(&service, "hba.se").await.is_none());
        assert_eq!(service.shorten("hbasebook.com", "none").await.unwrap(), "none");
        assert_eq!(service.shorten("whatever.com", "none").await.unwrap(), "none");
    }

    #[tokio::test]
    async fn delete_short_domain_absent_is_noop() {
        let service = service();
        service.delete_short_domain("nope").await.unwrap();
    }

    #[tokio::test]
    async fn list_returns_one_entry_per_short_domain() {
        let service = service();
        service.add_long_domain("hba.se", "hbasebook.com").await.unwrap();
        service.add_long_domain("oreil.ly", "www.oreilly.com").await.unwrap();
        service.add_long_domain("oreil.ly", "www.orly.com").await.unwrap();

        let listed = service.list_short_domains().await.unwrap();
        assert_eq!(listed.len(), 2);
        // Ascending by short-domain key.
        assert_eq!(listed[0].short_domain, "hba.se");
        assert_eq!(listed[1].short_domain, "oreil.ly");
    }

    #[tokio::test]
    async fn reregistering_moves_ownership() {
        let service = service();
        service.add_long_domain("a.io", "x.com").await.unwrap();
        service.add_long_domain("b.io", "x.com").await.unwrap();

        assert_eq!(service.shorten("x.com", "none").await.unwrap(), "b.io");

        // The old owner's column is cleaned up; its now-empty row no
        // longer appears in scans.
        assert!(find(&service, "a.io").await.is_none());
        let domain = find(&service, "b.io").await.expect("b.io listed");
        assert_eq!(as_set(&domain.long_domains), BTreeSet::from(["x.com"]));
    }

    #[tokio::test]
    async fn readding_same_pair_is_idempotent() {
        let service = service();
        service.add_long_domain("hba.se", "hbasebook.com").await.unwrap();
        service.add_long_domain("hba.se", "hbasebook.com").await.unwrap();

        let domain = find(&service, "hba.se").await.expect("hba.se listed");
        assert_eq!(domain.long_domains, vec!["hbasebook.com"]);
    }

    #[tokio::test]
    async fn arbitrary_strings_pass_through_unchecked() {
        let service = service();
        service.add_long_domain("short code", "not a url at all").await.unwrap();

        assert_eq!(
            service.shorten("not a url at all", "none").await.unwrap(),
            "short code"
        );
    }

    #[tokio::test]
    async fn seed_data_round_trip() {
        let service = service();
        service.create_domains().await.unwrap();

        let listed = service.list_short_domains().await.unwrap();
        assert_eq!(listed.len(), 2);

        let hbase = find(&service, "hba.se").await.unwrap();
        assert_eq!(
            as_set(&hbase.long_domains),
            BTreeSet::from(["hbasebook.com", "whatever.com", "seeya.com"])
        );

        let oreilly = find(&service, "oreil.ly").await.unwrap();
        assert_eq!(oreilly.long_domains.len(), 5);
        assert_eq!(service.shorten("hbasebook.com", "none").await.unwrap(), "hba.se");
    }
}

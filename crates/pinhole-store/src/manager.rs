use pinhole_core::{ColumnStore, Result, Row, StoreError, TableName};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

/// Default number of table leases that may be outstanding at once.
pub const DEFAULT_LEASE_POOL_SIZE: usize = 8;

/// Lends table-scoped leases over a shared [`ColumnStore`].
///
/// Callers borrow a [`TableLease`] per operation and the pool slot is
/// returned when the lease drops, on every exit path. A lease cannot
/// outlive its scope without the borrow showing it.
#[derive(Debug)]
pub struct ResourceManager<S> {
    store: Arc<S>,
    leases: Arc<Semaphore>,
}

impl<S> Clone for ResourceManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            leases: Arc::clone(&self.leases),
        }
    }
}

impl<S: ColumnStore> ResourceManager<S> {
    /// Creates a manager with the default lease pool size.
    pub fn new(store: S) -> Self {
        Self::with_pool_size(store, DEFAULT_LEASE_POOL_SIZE)
    }

    /// Creates a manager that hands out at most `pool_size` leases at once.
    pub fn with_pool_size(store: S, pool_size: usize) -> Self {
        Self {
            store: Arc::new(store),
            leases: Arc::new(Semaphore::new(pool_size)),
        }
    }

    /// Borrows a lease for the named table, suspending while the pool is
    /// exhausted.
    pub async fn table(&self, name: TableName) -> Result<TableLease<S>> {
        trace!(table = %name, "acquiring table lease");
        let permit = Arc::clone(&self.leases)
            .acquire_owned()
            .await
            .map_err(|_| StoreError::Operation("lease pool closed".to_string()))?;

        Ok(TableLease {
            store: Arc::clone(&self.store),
            name,
            _permit: permit,
        })
    }
}

/// A borrowed, table-scoped view of the store.
///
/// Every operation runs against the table the lease was acquired for.
/// Dropping the lease returns its pool slot.
#[derive(Debug)]
pub struct TableLease<S> {
    store: Arc<S>,
    name: TableName,
    _permit: OwnedSemaphorePermit,
}

impl<S: ColumnStore> TableLease<S> {
    /// The table this lease is scoped to.
    pub fn name(&self) -> TableName {
        self.name
    }

    pub async fn get(&self, key: &[u8], family: &str) -> Result<Option<Row>> {
        self.store.get(self.name, key, family).await
    }

    pub async fn put(&self, key: &[u8], family: &str, qualifier: &[u8], value: &[u8]) -> Result<()> {
        self.store.put(self.name, key, family, qualifier, value).await
    }

    pub async fn delete_row(&self, key: &[u8]) -> Result<()> {
        self.store.delete_row(self.name, key).await
    }

    pub async fn delete_rows(&self, keys: &[Vec<u8>]) -> Result<()> {
        self.store.delete_rows(self.name, keys).await
    }

    pub async fn delete_cell(&self, key: &[u8], family: &str, qualifier: &[u8]) -> Result<()> {
        self.store.delete_cell(self.name, key, family, qualifier).await
    }

    pub async fn scan(&self, family: &str) -> Result<Vec<Row>> {
        self.store.scan(self.name, family).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;

    const TABLE: TableName = TableName::new("test");
    const FAMILY: &str = "fam";

    #[tokio::test]
    async fn lease_reads_and_writes_its_table() {
        let rm = ResourceManager::new(InMemoryStore::new());

        let lease = rm.table(TABLE).await.unwrap();
        lease.put(b"row", FAMILY, b"col", b"value").await.unwrap();

        let row = lease.get(b"row", FAMILY).await.unwrap().unwrap();
        assert_eq!(row.value(b"col"), Some(&b"value"[..]));
    }

    #[tokio::test]
    async fn leases_are_scoped_to_their_table() {
        let rm = ResourceManager::new(InMemoryStore::new());

        let first = rm.table(TableName::new("one")).await.unwrap();
        first.put(b"row", FAMILY, b"col", b"value").await.unwrap();
        drop(first);

        let second = rm.table(TableName::new("two")).await.unwrap();
        assert!(second.get(b"row", FAMILY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dropping_a_lease_frees_its_pool_slot() {
        let rm = ResourceManager::with_pool_size(InMemoryStore::new(), 1);

        let lease = rm.table(TABLE).await.unwrap();
        drop(lease);

        // Would suspend forever if the slot had leaked.
        let lease = rm.table(TABLE).await.unwrap();
        drop(lease);
    }

    #[tokio::test]
    async fn pool_exhaustion_suspends_until_release() {
        let rm = ResourceManager::with_pool_size(InMemoryStore::new(), 1);
        let held = rm.table(TABLE).await.unwrap();

        let waiter = {
            let rm = rm.clone();
            tokio::spawn(async move { rm.table(TABLE).await.map(|_| ()) })
        };

        // The waiter cannot finish while the only lease is held.
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter.await.unwrap().unwrap();
    }
}

use async_trait::async_trait;
use pinhole_core::{ColumnStore, Result, Row, StoreError, TableName};
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Columns = BTreeMap<Vec<u8>, Vec<u8>>;
type Families = HashMap<String, Columns>;
type Table = BTreeMap<Vec<u8>, Families>;

/// In-memory implementation of the [`ColumnStore`] contract.
///
/// Rows are kept in a `BTreeMap` per table, so scans come back in
/// ascending row-key order without extra bookkeeping.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<TableName, Table>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<TableName, Table>>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Operation("table lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<TableName, Table>>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Operation("table lock poisoned".to_string()))
    }
}

#[async_trait]
impl ColumnStore for InMemoryStore {
    async fn get(&self, table: TableName, key: &[u8], family: &str) -> Result<Option<Row>> {
        let tables = self.read()?;
        let columns = tables
            .get(&table)
            .and_then(|rows| rows.get(key))
            .and_then(|families| families.get(family));

        Ok(match columns {
            Some(columns) if !columns.is_empty() => Some(Row::new(key.to_vec(), columns.clone())),
            _ => None,
        })
    }

    async fn put(
        &self,
        table: TableName,
        key: &[u8],
        family: &str,
        qualifier: &[u8],
        value: &[u8],
    ) -> Result<()> {
        let mut tables = self.write()?;
        tables
            .entry(table)
            .or_default()
            .entry(key.to_vec())
            .or_default()
            .entry(family.to_string())
            .or_default()
            .insert(qualifier.to_vec(), value.to_vec());
        Ok(())
    }

    async fn delete_row(&self, table: TableName, key: &[u8]) -> Result<()> {
        let mut tables = self.write()?;
        if let Some(rows) = tables.get_mut(&table) {
            rows.remove(key);
        }
        Ok(())
    }

    async fn delete_rows(&self, table: TableName, keys: &[Vec<u8>]) -> Result<()> {
        let mut tables = self.write()?;
        if let Some(rows) = tables.get_mut(&table) {
            for key in keys {
                rows.remove(key);
            }
        }
        Ok(())
    }

    async fn delete_cell(
        &self,
        table: TableName,
        key: &[u8],
        family: &str,
        qualifier: &[u8],
    ) -> Result<()> {
        let mut tables = self.write()?;
        let Some(rows) = tables.get_mut(&table) else {
            return Ok(());
        };
        let Some(families) = rows.get_mut(key) else {
            return Ok(());
        };
        if let Some(columns) = families.get_mut(family) {
            columns.remove(qualifier);
            if columns.is_empty() {
                families.remove(family);
            }
        }
        if families.is_empty() {
            rows.remove(key);
        }
        Ok(())
    }

    async fn scan(&self, table: TableName, family: &str) -> Result<Vec<Row>> {
        let tables = self.read()?;
        let Some(rows) = tables.get(&table) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .iter()
            .filter_map(|(key, families)| {
                families
                    .get(family)
                    .filter(|columns| !columns.is_empty())
                    .map(|columns| Row::new(key.clone(), columns.clone()))
            })
            .collect())
    }
}

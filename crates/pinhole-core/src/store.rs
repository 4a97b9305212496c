use crate::error::Result;
use crate::row::Row;
use crate::table::TableName;
use async_trait::async_trait;

/// Contract for a column-family store.
///
/// Rows live in named tables, cells are addressed by row key, column
/// family, and column qualifier. Keys, qualifiers, and values cross this
/// boundary as raw bytes.
///
/// Implementations must return scan results in ascending row-key order.
#[async_trait]
pub trait ColumnStore: Send + Sync + 'static {
    /// Reads one row, restricted to the given family.
    /// Returns `None` if the row does not exist or has no columns in the family.
    async fn get(&self, table: TableName, key: &[u8], family: &str) -> Result<Option<Row>>;

    /// Writes a single cell, creating the row if absent and overwriting
    /// the cell if present.
    async fn put(
        &self,
        table: TableName,
        key: &[u8],
        family: &str,
        qualifier: &[u8],
        value: &[u8],
    ) -> Result<()>;

    /// Deletes a whole row. Deleting an absent row is not an error.
    async fn delete_row(&self, table: TableName, key: &[u8]) -> Result<()>;

    /// Deletes several whole rows in one batch.
    async fn delete_rows(&self, table: TableName, keys: &[Vec<u8>]) -> Result<()>;

    /// Deletes a single cell. Once the last cell of a row is gone the row
    /// no longer appears in reads or scans.
    async fn delete_cell(
        &self,
        table: TableName,
        key: &[u8],
        family: &str,
        qualifier: &[u8],
    ) -> Result<()>;

    /// Reads every row of the table that has columns in the given family,
    /// in ascending row-key order.
    async fn scan(&self, table: TableName, family: &str) -> Result<Vec<Row>>;
}

use async_trait::async_trait;
use pinhole_core::{ColumnStore, Result, Row, StoreError, TableName};
use redis::AsyncCommands;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

/// Redis-backed implementation of the [`ColumnStore`] contract.
///
/// Each row is a Redis hash keyed `{prefix}{table}:row:{key}`, with one
/// hash field per `{family}:{qualifier}` pair. A per-table sorted set
/// (`{prefix}{table}:rows`, all scores zero) tracks the live row keys;
/// equal-score members sort lexicographically, which preserves the
/// ascending-key scan order the contract requires.
#[derive(Debug, Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        StoreError::Timeout(message)
    } else {
        StoreError::Query(message)
    }
}

/// Encodes a `{family}:{qualifier}` hash field.
fn field(family: &str, qualifier: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(family.len() + 1 + qualifier.len());
    out.extend_from_slice(family.as_bytes());
    out.push(b':');
    out.extend_from_slice(qualifier);
    out
}

/// Extracts the qualifier from a hash field belonging to `family`.
/// Returns `None` for fields of other families.
fn qualifier_of<'a>(family: &str, field: &'a [u8]) -> Option<&'a [u8]> {
    field
        .strip_prefix(family.as_bytes())
        .and_then(|rest| rest.strip_prefix(b":"))
}

impl RedisStore {
    /// Creates a new Redis store over an existing multiplexed connection.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, "ph:")
    }

    /// Creates a new Redis store with a custom key prefix.
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Creates a store by opening a new connection to the given Redis URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Unavailable(format!("redis client open: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(format!("redis connect: {e}")))?;
        Ok(Self::new(conn))
    }

    fn row_key(&self, table: TableName, key: &[u8]) -> Vec<u8> {
        let mut out = format!("{}{}:row:", self.key_prefix, table).into_bytes();
        out.extend_from_slice(key);
        out
    }

    fn index_key(&self, table: TableName) -> String {
        format!("{}{}:rows", self.key_prefix, table)
    }

    fn row_from_fields(
        key: &[u8],
        family: &str,
        fields: HashMap<Vec<u8>, Vec<u8>>,
    ) -> Option<Row> {
        let columns: BTreeMap<Vec<u8>, Vec<u8>> = fields
            .into_iter()
            .filter_map(|(f, value)| qualifier_of(family, &f).map(|q| (q.to_vec(), value)))
            .collect();
        if columns.is_empty() {
            None
        } else {
            Some(Row::new(key.to_vec(), columns))
        }
    }
}

#[async_trait]
impl ColumnStore for RedisStore {
    async fn get(&self, table: TableName, key: &[u8], family: &str) -> Result<Option<Row>> {
        trace!(table = %table, "fetching row");
        let mut conn = self.conn.clone();
        let fields: HashMap<Vec<u8>, Vec<u8>> = conn
            .hgetall(self.row_key(table, key))
            .await
            .map_err(|e| map_redis_error("hgetall", e))?;

        Ok(Self::row_from_fields(key, family, fields))
    }

    async fn put(
        &self,
        table: TableName,
        key: &[u8],
        family: &str,
        qualifier: &[u8],
        value: &[u8],
    ) -> Result<()> {
        trace!(table = %table, "writing cell");
        let mut conn = self.conn.clone();
        let _: () = conn
            .hset(self.row_key(table, key), field(family, qualifier), value)
            .await
            .map_err(|e| map_redis_error("hset", e))?;
        let _: () = conn
            .zadd(self.index_key(table), key, 0)
            .await
            .map_err(|e| map_redis_error("zadd", e))?;
        Ok(())
    }

    async fn delete_row(&self, table: TableName, key: &[u8]) -> Result<()> {
        debug!(table = %table, "deleting row");
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(self.row_key(table, key))
            .await
            .map_err(|e| map_redis_error("del", e))?;
        let _: () = conn
            .zrem(self.index_key(table), key)
            .await
            .map_err(|e| map_redis_error("zrem", e))?;
        Ok(())
    }

    async fn delete_rows(&self, table: TableName, keys: &[Vec<u8>]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        debug!(table = %table, count = keys.len(), "deleting rows");

        let index_key = self.index_key(table);
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.del(self.row_key(table, key)).ignore();
            pipe.zrem(&index_key, key.as_slice()).ignore();
        }

        let mut conn = self.conn.clone();
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| map_redis_error("pipelined delete", e))?;
        Ok(())
    }

    async fn delete_cell(
        &self,
        table: TableName,
        key: &[u8],
        family: &str,
        qualifier: &[u8],
    ) -> Result<()> {
        debug!(table = %table, "deleting cell");
        let row_key = self.row_key(table, key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .hdel(&row_key, field(family, qualifier))
            .await
            .map_err(|e| map_redis_error("hdel", e))?;

        // Redis drops an empty hash; the row index has to follow.
        let remaining: usize = conn
            .hlen(&row_key)
            .await
            .map_err(|e| map_redis_error("hlen", e))?;
        if remaining == 0 {
            let _: () = conn
                .zrem(self.index_key(table), key)
                .await
                .map_err(|e| map_redis_error("zrem", e))?;
        }
        Ok(())
    }

    async fn scan(&self, table: TableName, family: &str) -> Result<Vec<Row>> {
        trace!(table = %table, family = family, "scanning table");
        let mut conn = self.conn.clone();
        let keys: Vec<Vec<u8>> = conn
            .zrange(self.index_key(table), 0, -1)
            .await
            .map_err(|e| map_redis_error("zrange", e))?;

        let mut rows = Vec::with_capacity(keys.len());
        for key in keys {
            let fields: HashMap<Vec<u8>, Vec<u8>> = conn
                .hgetall(self.row_key(table, &key))
                .await
                .map_err(|e| map_redis_error("hgetall", e))?;
            if let Some(row) = Self::row_from_fields(&key, family, fields) {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_encoding() {
        assert_eq!(field("domains", b"www.example.com"), b"domains:www.example.com");
    }

    #[test]
    fn qualifier_extraction() {
        assert_eq!(
            qualifier_of("domains", b"domains:www.example.com"),
            Some(&b"www.example.com"[..])
        );
        assert_eq!(qualifier_of("data", b"domains:www.example.com"), None);
    }

    #[test]
    fn qualifier_may_contain_separator() {
        assert_eq!(qualifier_of("data", b"data:a:b"), Some(&b"a:b"[..]));
    }
}

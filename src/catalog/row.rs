// Row Module
//
// This module defines the Row type: a keyed set of columns inside a column
// family.

use std::fmt;

use crate::common::concurrent_map::ShardedMap;
use crate::common::types::{ByteKey, ROW_COLUMN_SHARD_COUNT, ValueBytes, display_bytes};
use crate::query::executor::result::{QueryError, QueryResult};

use super::column::Column;

/// A record inside a column family
#[derive(Clone)]
pub struct Row {
    key: ByteKey,
    columns: ShardedMap<ByteKey, Column>,
}

impl Row {
    /// Create an empty row. The key must not be empty.
    pub fn new(key: impl Into<ByteKey>) -> QueryResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(QueryError::InvalidArguments("row key must not be empty".to_string()));
        }
        Ok(Row {
            key,
            columns: ShardedMap::with_shards(ROW_COLUMN_SHARD_COUNT),
        })
    }

    pub fn key(&self) -> &ByteKey {
        &self.key
    }

    /// Add a column; when a column with the same key exists only its value is
    /// replaced.
    pub fn add_column(&self, column: Column) {
        let (key, value) = column.into_parts();
        match value {
            Some(value) => {
                self.put(key, value);
            }
            None => {
                // Keep any existing value, otherwise store the empty column
                let _ = self.columns.try_insert(key.clone(), Column::new(key));
            }
        }
    }

    /// Overwrite the value of an existing column or append a new one.
    /// Returns the previous value, if there was one.
    pub fn put(&self, key: ByteKey, value: ValueBytes) -> Option<ValueBytes> {
        let column_key = key.clone();
        self.columns
            .upsert_with(key, || Column::new(column_key), |column| column.set_value(value))
    }

    pub fn get_column(&self, key: &[u8]) -> Option<Column> {
        self.columns.get(key)
    }

    pub fn get_value(&self, key: &[u8]) -> Option<ValueBytes> {
        self.columns.with(key, |column| column.value().map(<[u8]>::to_vec)).flatten()
    }

    /// Replace the value of an existing column
    pub fn update_column(&self, key: &[u8], value: impl Into<ValueBytes>) -> QueryResult<Option<ValueBytes>> {
        self.columns
            .with_mut(key, |column| column.set_value(value))
            .ok_or_else(|| QueryError::DataNotFound(format!("column '{}'", display_bytes(key))))
    }

    pub fn delete_column(&self, key: &[u8]) -> QueryResult<Column> {
        self.columns
            .remove(key)
            .ok_or_else(|| QueryError::DataNotFound(format!("column '{}'", display_bytes(key))))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns ordered by key bytes
    pub fn columns(&self) -> Vec<Column> {
        let mut columns: Vec<Column> = self.columns.snapshot().into_iter().map(|(_, c)| c).collect();
        columns.sort_by(|a, b| a.key().cmp(b.key()));
        columns
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.columns() == other.columns()
    }
}

impl Eq for Row {}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("key", &self.key)
            .field("columns", &self.columns())
            .finish()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"{}\":{{", self.key)?;
        for (i, column) in self.columns().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            let value = column.value().map(display_bytes).unwrap_or_default();
            write!(f, "\"{}\":\"{}\"", column.key(), value)?;
        }
        write!(f, "}}}}")
    }
}

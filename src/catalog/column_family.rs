// Column Family Module
//
// This module defines the ColumnFamily type, a named map of rows inside a
// keyspace.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::common::concurrent_map::ShardedMap;
use crate::common::types::{ByteKey, ValueBytes, display_bytes};
use crate::query::executor::result::{QueryError, QueryResult};

use super::column::Column;
use super::row::Row;

/// Serializable image of a row, used by the storage layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    pub key: ByteKey,
    pub columns: Vec<Column>,
}

/// Map of rows keyed by their byte key
pub struct ColumnFamily {
    rows: ShardedMap<ByteKey, Row>,
    dirty: AtomicBool,
}

impl ColumnFamily {
    /// Create an empty, dirty column family
    pub fn new() -> Self {
        ColumnFamily {
            rows: ShardedMap::new(),
            dirty: AtomicBool::new(true),
        }
    }

    /// Rebuild a column family from stored records. Duplicate row keys are
    /// rejected. The result is clean.
    pub fn from_records(records: Vec<RowRecord>) -> QueryResult<Self> {
        let family = ColumnFamily::new();
        for record in records {
            let row = Row::new(record.key)?;
            for column in record.columns {
                row.add_column(column);
            }
            family.add_row(row)?;
        }
        family.mark_clean();
        Ok(family)
    }

    /// Add a new row. Fails if a row with the same key exists.
    pub fn add_row(&self, row: Row) -> QueryResult<()> {
        let key = row.key().clone();
        self.rows
            .try_insert(key, row)
            .map_err(|row| QueryError::KeyAlreadyExists(format!("row '{}'", row.key())))?;
        self.mark_dirty();
        Ok(())
    }

    /// Detached copy of the row under `key`
    pub fn get_row(&self, key: &[u8]) -> Option<Row> {
        self.rows.get(key)
    }

    pub fn contains_row(&self, key: &[u8]) -> bool {
        self.rows.contains_key(key)
    }

    /// Replace the value of an existing column of an existing row
    pub fn update_row(&self, key: &[u8], column_key: &[u8], value: impl Into<ValueBytes>) -> QueryResult<()> {
        self.rows
            .with(key, |row| row.update_column(column_key, value))
            .ok_or_else(|| QueryError::DataNotFound(format!("row '{}'", display_bytes(key))))??;
        self.mark_dirty();
        Ok(())
    }

    /// Write every `(key, value)` pair into the row under `key`, creating the
    /// row from `fresh` when it does not exist yet.
    pub fn upsert_row(&self, fresh: Row, pairs: &[(ByteKey, ValueBytes)]) {
        let key = fresh.key().clone();
        self.rows.upsert_with(
            key,
            || fresh,
            |row| {
                for (column_key, value) in pairs {
                    row.put(column_key.clone(), value.clone());
                }
            },
        );
        self.mark_dirty();
    }

    /// Write every `(key, value)` pair into an existing row
    pub fn update_columns(&self, key: &[u8], pairs: &[(ByteKey, ValueBytes)]) -> QueryResult<()> {
        self.rows
            .with(key, |row| {
                for (column_key, value) in pairs {
                    row.put(column_key.clone(), value.clone());
                }
            })
            .ok_or_else(|| QueryError::DataNotFound(format!("row '{}'", display_bytes(key))))?;
        self.mark_dirty();
        Ok(())
    }

    pub fn delete_row(&self, key: &[u8]) -> QueryResult<Row> {
        let row = self
            .rows
            .remove(key)
            .ok_or_else(|| QueryError::DataNotFound(format!("row '{}'", display_bytes(key))))?;
        self.mark_dirty();
        Ok(row)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Records of every row, ordered by row key
    pub fn snapshot(&self) -> Vec<RowRecord> {
        let mut records: Vec<RowRecord> = self
            .rows
            .snapshot()
            .into_iter()
            .map(|(key, row)| RowRecord {
                key,
                columns: row.columns(),
            })
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    pub fn mark_clean(&self) {
        self.dirty.store(false, Ordering::Release);
    }

    /// Clear the dirty flag, reporting whether it was set
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

impl Default for ColumnFamily {
    fn default() -> Self {
        Self::new()
    }
}

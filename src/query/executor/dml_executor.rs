// Data Manipulation Executor
//
// This module handles row statements: INSERT, UPDATE, SELECT and DELETE.

use std::sync::Arc;

use crate::catalog::{ColumnFamily, Registry, Row};
use crate::common::types::{ByteKey, ValueBytes};
use crate::query::executor::ddl_executor::resolve_key_space;
use crate::query::executor::result::{QueryError, QueryResult};

/// Handles execution of DML operations
pub struct DmlExecutor<'r> {
    registry: &'r Registry,
}

impl<'r> DmlExecutor<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        DmlExecutor { registry }
    }

    fn column_family(&self, key_space: Option<&str>, name: &str) -> QueryResult<Arc<ColumnFamily>> {
        let space = resolve_key_space(self.registry, key_space)?;
        space
            .get_column_family(name)
            .ok_or_else(|| QueryError::DataNotFound(format!("column family '{}'", name)))
    }

    /// Write columns into a row, creating the row when needed
    pub fn insert(
        &self,
        key_space: Option<&str>,
        column_family: &str,
        row_key: &ByteKey,
        keys: &[ByteKey],
        values: &[ValueBytes],
    ) -> QueryResult<()> {
        let pairs = pair_columns(keys, values)?;
        let fresh = Row::new(row_key.clone())?;
        let family = self.column_family(key_space, column_family)?;
        family.upsert_row(fresh, &pairs);
        Ok(())
    }

    /// Write columns into an existing row
    pub fn update(
        &self,
        key_space: Option<&str>,
        column_family: &str,
        row_key: &ByteKey,
        keys: &[ByteKey],
        values: &[ValueBytes],
    ) -> QueryResult<()> {
        let pairs = pair_columns(keys, values)?;
        require_row_key(row_key)?;
        let family = self.column_family(key_space, column_family)?;
        family.update_columns(row_key.as_bytes(), &pairs)
    }

    /// Copy of the row, `None` when the row does not exist
    pub fn select(&self, key_space: Option<&str>, column_family: &str, row_key: &ByteKey) -> QueryResult<Option<Row>> {
        let family = self.column_family(key_space, column_family)?;
        Ok(family.get_row(row_key.as_bytes()))
    }

    pub fn delete(&self, key_space: Option<&str>, column_family: &str, row_key: &ByteKey) -> QueryResult<Row> {
        let family = self.column_family(key_space, column_family)?;
        family.delete_row(row_key.as_bytes())
    }
}

fn require_row_key(row_key: &ByteKey) -> QueryResult<()> {
    if row_key.is_empty() {
        return Err(QueryError::InvalidArguments("row key must not be empty".to_string()));
    }
    Ok(())
}

fn pair_columns(keys: &[ByteKey], values: &[ValueBytes]) -> QueryResult<Vec<(ByteKey, ValueBytes)>> {
    if keys.len() != values.len() {
        return Err(QueryError::InvalidArguments(format!(
            "{} column keys but {} values",
            keys.len(),
            values.len()
        )));
    }
    Ok(keys.iter().cloned().zip(values.iter().cloned()).collect())
}

// KeySpace Module
//
// This module defines the KeySpace type, a named container of column
// families (the equivalent of a database).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::concurrent_map::ShardedMap;
use crate::query::executor::result::{QueryError, QueryResult};

use super::column_family::ColumnFamily;

pub struct KeySpace {
    name: String,
    column_families: ShardedMap<String, Arc<ColumnFamily>>,
    dirty: AtomicBool,
}

impl KeySpace {
    /// Create an empty, dirty keyspace. The name must not be empty.
    pub fn new(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(QueryError::InvalidArguments("keyspace name must not be empty".to_string()));
        }
        Ok(KeySpace {
            name,
            column_families: ShardedMap::new(),
            dirty: AtomicBool::new(true),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a column family under `name`
    pub fn add_column_family(&self, name: impl Into<String>, family: ColumnFamily) -> QueryResult<Arc<ColumnFamily>> {
        let name = name.into();
        if name.is_empty() {
            return Err(QueryError::InvalidArguments("column family name must not be empty".to_string()));
        }
        let family = Arc::new(family);
        self.column_families
            .try_insert(name.clone(), Arc::clone(&family))
            .map_err(|_| QueryError::KeyAlreadyExists(format!("column family '{}'", name)))?;
        self.mark_dirty();
        Ok(family)
    }

    pub fn get_column_family(&self, name: &str) -> Option<Arc<ColumnFamily>> {
        self.column_families.get(name)
    }

    pub fn drop_column_family(&self, name: &str) -> QueryResult<()> {
        self.column_families
            .remove(name)
            .ok_or_else(|| QueryError::DataNotFound(format!("column family '{}'", name)))?;
        self.mark_dirty();
        Ok(())
    }

    /// Snapshot of all column families ordered by name
    pub fn column_families(&self) -> Vec<(String, Arc<ColumnFamily>)> {
        let mut families = self.column_families.snapshot();
        families.sort_by(|a, b| a.0.cmp(&b.0));
        families
    }

    pub fn column_family_count(&self) -> usize {
        self.column_families.len()
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

impl std::fmt::Debug for KeySpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySpace")
            .field("name", &self.name)
            .field("column_families", &self.column_families.keys())
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

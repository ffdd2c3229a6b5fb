// KeySpace Registry
//
// The registry is the root of the data model: it owns every keyspace and
// remembers what was dropped so the storage layer can remove it from disk.
// One registry is created per process by the composition root and handed to
// sessions and commands explicitly.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::common::concurrent_map::ShardedMap;
use crate::query::executor::result::{QueryError, QueryResult};

use super::keyspace::KeySpace;

/// Names removed from the registry since the last flush
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PendingDeletions {
    /// Dropped keyspaces, in drop order
    pub key_spaces: Vec<String>,
    /// Dropped column families per keyspace name, in drop order
    pub column_families: HashMap<String, Vec<String>>,
}

impl PendingDeletions {
    pub fn is_empty(&self) -> bool {
        self.key_spaces.is_empty() && self.column_families.values().all(Vec::is_empty)
    }
}

#[derive(Default)]
pub struct Registry {
    key_spaces: ShardedMap<String, Arc<KeySpace>>,
    pending: Mutex<PendingDeletions>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a keyspace under its own name
    pub fn add_key_space(&self, key_space: KeySpace) -> QueryResult<Arc<KeySpace>> {
        let name = key_space.name().to_string();
        let key_space = Arc::new(key_space);
        self.key_spaces
            .try_insert(name.clone(), Arc::clone(&key_space))
            .map_err(|_| QueryError::KeyAlreadyExists(format!("keyspace '{}'", name)))?;
        debug!("Registered keyspace {}", name);
        Ok(key_space)
    }

    pub fn get_key_space(&self, name: &str) -> Option<Arc<KeySpace>> {
        self.key_spaces.get(name)
    }

    /// Remove a keyspace and schedule its on-disk deletion
    pub fn drop_key_space(&self, name: &str) -> QueryResult<()> {
        self.key_spaces
            .remove(name)
            .ok_or_else(|| QueryError::DataNotFound(format!("keyspace '{}'", name)))?;

        let mut pending = self.pending.lock();
        // The whole directory goes, so per-family deletions are moot
        pending.column_families.remove(name);
        pending.key_spaces.push(name.to_string());
        debug!("Dropped keyspace {}", name);
        Ok(())
    }

    /// Schedule the on-disk deletion of a column family removed from `key_space`
    pub fn note_column_family_dropped(&self, key_space: &str, column_family: &str) {
        self.pending
            .lock()
            .column_families
            .entry(key_space.to_string())
            .or_default()
            .push(column_family.to_string());
    }

    /// Hand the pending deletions to the caller and reset the lists
    pub fn take_pending_deletions(&self) -> PendingDeletions {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Put back deletions that could not be carried out. They are kept ahead
    /// of anything dropped since they were taken.
    pub fn requeue_pending_deletions(&self, mut earlier: PendingDeletions) {
        let mut pending = self.pending.lock();
        let later = std::mem::take(&mut *pending);

        for key_space in &later.key_spaces {
            earlier.column_families.remove(key_space);
        }
        earlier.key_spaces.extend(later.key_spaces);
        for (key_space, families) in later.column_families {
            earlier.column_families.entry(key_space).or_default().extend(families);
        }
        *pending = earlier;
    }

    /// Snapshot of all keyspaces ordered by name
    pub fn key_spaces(&self) -> Vec<(String, Arc<KeySpace>)> {
        let mut spaces = self.key_spaces.snapshot();
        spaces.sort_by(|a, b| a.0.cmp(&b.0));
        spaces
    }

    pub fn len(&self) -> usize {
        self.key_spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_spaces.is_empty()
    }

    /// Forget every keyspace without scheduling deletions
    pub fn clear(&self) {
        self.key_spaces.clear();
        *self.pending.lock() = PendingDeletions::default();
    }
}

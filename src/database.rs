// Database
//
// Composition root: one registry per process, the storage it is persisted
// with and the directory it lives in. Cloning a Database shares all three.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::Registry;
use crate::server::session::Session;
use crate::storage::{SnapshotStorage, Storage, StorageResult, StorageStats};

#[derive(Clone)]
pub struct Database {
    registry: Arc<Registry>,
    storage: Arc<dyn Storage>,
    data_dir: PathBuf,
}

impl Database {
    /// Empty database persisted with snapshot storage under `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_storage(data_dir, Arc::new(SnapshotStorage::new()))
    }

    pub fn with_storage(data_dir: impl Into<PathBuf>, storage: Arc<dyn Storage>) -> Self {
        Database {
            registry: Arc::new(Registry::new()),
            storage,
            data_dir: data_dir.into(),
        }
    }

    /// Database loaded from whatever is stored under `data_dir`
    pub fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let db = Self::new(data_dir);
        db.load()?;
        Ok(db)
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load(&self) -> StorageResult<StorageStats> {
        self.storage.read(&self.data_dir, &self.registry)
    }

    pub fn flush(&self) -> StorageResult<StorageStats> {
        self.storage.write(&self.data_dir, &self.registry)
    }

    /// New connection session. When `flush_after_each_statement` is set the
    /// session flushes storage after every successful mutation.
    pub fn session(&self, flush_after_each_statement: bool) -> Session {
        Session::new(self.clone(), flush_after_each_statement)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("data_dir", &self.data_dir)
            .field("key_spaces", &self.registry.len())
            .finish()
    }
}

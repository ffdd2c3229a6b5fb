// Storage Module
//
// This module persists the registry between runs. Storage implementations
// only read dirty flags and snapshots of the live data; the one thing they
// change is the dirty flags they flush.

pub mod disk;

use std::path::Path;

use thiserror::Error;

use crate::catalog::Registry;
use crate::query::executor::result::QueryError;

pub use self::disk::snapshot_storage::SnapshotStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("Corrupt storage: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Query(#[from] QueryError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Counts reported by a load or flush
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub key_spaces: usize,
    pub column_families: usize,
    pub deleted: usize,
}

/// Durable home of a registry
pub trait Storage: Send + Sync {
    /// Populate `registry` from the state stored under `root`
    fn read(&self, root: &Path, registry: &Registry) -> StorageResult<StorageStats>;

    /// Write every dirty keyspace and column family under `root`, clear
    /// their dirty flags and delete whatever was dropped since the last write
    fn write(&self, root: &Path, registry: &Registry) -> StorageResult<StorageStats>;
}

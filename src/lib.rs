// PQL Column-Family Store

pub mod catalog;
pub mod common;
pub mod database;
pub mod query;
pub mod server;
pub mod storage;

// Re-export key items for convenient access
pub use catalog::{Column, ColumnFamily, KeySpace, Registry, Row};
pub use common::types::ByteKey;
pub use database::Database;
pub use query::compile;
pub use query::executor::{Command, ExecutionContext, ExecutionOutput, QueryError, QueryResult};
pub use server::{Server, ServerConfig, Session};
pub use storage::{SnapshotStorage, Storage, StorageError};

//! Data Model Module
//!
//! This module holds the in-memory data model mutated by PQL commands:
//! Registry → KeySpace → ColumnFamily → Row → Column. Every collection is a
//! sharded concurrent map, so connections working on independent keys never
//! block each other.

pub mod column;
pub mod column_family;
pub mod keyspace;
pub mod registry;
pub mod row;

// Re-export key types
pub use self::column::Column;
pub use self::column_family::{ColumnFamily, RowRecord};
pub use self::keyspace::KeySpace;
pub use self::registry::{PendingDeletions, Registry};
pub use self::row::Row;

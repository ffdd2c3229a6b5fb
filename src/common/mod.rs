// Shared building blocks used across the store

pub mod concurrent_map;
pub mod types;

pub use concurrent_map::ShardedMap;
pub use types::{ByteKey, ValueBytes};

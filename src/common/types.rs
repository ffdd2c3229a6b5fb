use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of lock shards used by concurrent maps unless configured otherwise
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// Shard count of the column map inside each row
pub const ROW_COLUMN_SHARD_COUNT: usize = 1;

/// Raw value bytes stored in a column
pub type ValueBytes = Vec<u8>;

/// Byte-string key with structural equality, ordering and hashing.
///
/// Used wherever raw bytes act as a map key (row keys, column keys), so two
/// keys built from equal byte content always address the same entry.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ByteKey(Vec<u8>);

impl ByteKey {
    /// Create a key from anything convertible into bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        ByteKey(bytes.into())
    }

    /// Borrow the key content
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the key and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl Borrow<[u8]> for ByteKey {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for ByteKey {
    fn from(value: &str) -> Self {
        ByteKey(value.as_bytes().to_vec())
    }
}

impl From<String> for ByteKey {
    fn from(value: String) -> Self {
        ByteKey(value.into_bytes())
    }
}

impl From<Vec<u8>> for ByteKey {
    fn from(value: Vec<u8>) -> Self {
        ByteKey(value)
    }
}

impl From<&[u8]> for ByteKey {
    fn from(value: &[u8]) -> Self {
        ByteKey(value.to_vec())
    }
}

impl fmt::Debug for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteKey({})", display_bytes(&self.0))
    }
}

impl fmt::Display for ByteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_bytes(&self.0))
    }
}

/// Render bytes as text when they are valid UTF-8, hex otherwise
pub fn display_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => format!("0x{}", hex::encode(bytes)),
    }
}

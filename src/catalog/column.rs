// Column Module
//
// This module defines the Column type, a single key/value cell of a row.

use serde::{Deserialize, Serialize};

use crate::common::types::{ByteKey, ValueBytes};

/// A key/value pair within a row. The key is fixed at construction, the value
/// may be replaced any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    key: ByteKey,
    value: Option<ValueBytes>,
}

impl Column {
    /// Create a column without a value
    pub fn new(key: impl Into<ByteKey>) -> Self {
        Column {
            key: key.into(),
            value: None,
        }
    }

    /// Create a column holding `value`
    pub fn with_value(key: impl Into<ByteKey>, value: impl Into<ValueBytes>) -> Self {
        Column {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn key(&self) -> &ByteKey {
        &self.key
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    /// Replace the value and return the previous one
    pub fn set_value(&mut self, value: impl Into<ValueBytes>) -> Option<ValueBytes> {
        self.value.replace(value.into())
    }

    pub(crate) fn into_parts(self) -> (ByteKey, Option<ValueBytes>) {
        (self.key, self.value)
    }
}

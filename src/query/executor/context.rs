// Execution Context
//
// Per-connection state: the keyspace selected with USE. The context holds a
// weak reference so a keyspace dropped by another connection is not kept
// alive by sessions that still have it selected.

use std::sync::{Arc, Weak};

use crate::catalog::KeySpace;

#[derive(Debug, Default, Clone)]
pub struct ExecutionContext {
    current: Option<(String, Weak<KeySpace>)>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `key_space` for subsequent statements
    pub fn use_key_space(&mut self, key_space: &Arc<KeySpace>) {
        self.current = Some((key_space.name().to_string(), Arc::downgrade(key_space)));
    }

    /// Name of the selected keyspace, even if it has since been dropped
    pub fn key_space_name(&self) -> Option<&str> {
        self.current.as_ref().map(|(name, _)| name.as_str())
    }

    /// The selected keyspace while it is still alive
    pub fn key_space(&self) -> Option<Arc<KeySpace>> {
        self.current.as_ref().and_then(|(_, space)| space.upgrade())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

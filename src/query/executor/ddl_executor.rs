// Data Definition Executor
//
// This module handles keyspace and column family statements: KEYSPACE, KILL,
// USE, CREATE COLUMNFAMILY and DROP COLUMNFAMILY.

use std::sync::Arc;

use log::debug;

use crate::catalog::{ColumnFamily, KeySpace, Registry};
use crate::query::executor::context::ExecutionContext;
use crate::query::executor::result::{QueryError, QueryResult};

/// Look up the keyspace a command was compiled against
pub(crate) fn resolve_key_space(registry: &Registry, name: Option<&str>) -> QueryResult<Arc<KeySpace>> {
    let name = name.ok_or_else(|| QueryError::DataNotFound("no keyspace selected".to_string()))?;
    registry
        .get_key_space(name)
        .ok_or_else(|| QueryError::DataNotFound(format!("keyspace '{}'", name)))
}

/// Handles execution of DDL operations
pub struct DdlExecutor<'r> {
    registry: &'r Registry,
}

impl<'r> DdlExecutor<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        DdlExecutor { registry }
    }

    pub fn create_key_space(&self, name: &str) -> QueryResult<Arc<KeySpace>> {
        let space = self.registry.add_key_space(KeySpace::new(name)?)?;
        debug!("Created keyspace {}", name);
        Ok(space)
    }

    pub fn drop_key_space(&self, name: &str) -> QueryResult<()> {
        self.registry.drop_key_space(name)
    }

    /// Select `name` in the connection context
    pub fn use_key_space(&self, name: &str, ctx: &mut ExecutionContext) -> QueryResult<Arc<KeySpace>> {
        let space = resolve_key_space(self.registry, Some(name))?;
        ctx.use_key_space(&space);
        Ok(space)
    }

    pub fn create_column_family(&self, key_space: Option<&str>, name: &str) -> QueryResult<Arc<ColumnFamily>> {
        let space = resolve_key_space(self.registry, key_space)?;
        let family = space.add_column_family(name, ColumnFamily::new())?;
        debug!("Created column family {}.{}", space.name(), name);
        Ok(family)
    }

    pub fn drop_column_family(&self, key_space: Option<&str>, name: &str) -> QueryResult<()> {
        let space = resolve_key_space(self.registry, key_space)?;
        space.drop_column_family(name)?;
        self.registry.note_column_family_dropped(space.name(), name);
        debug!("Dropped column family {}.{}", space.name(), name);
        Ok(())
    }
}

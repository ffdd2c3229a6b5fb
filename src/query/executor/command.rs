// Command Definitions
//
// A Command is the compiled form of one PQL statement. It carries the literal
// arguments of the statement and runs against a registry as one atomic unit.

use crate::catalog::Registry;
use crate::common::types::{ByteKey, ValueBytes};

use super::context::ExecutionContext;
use super::ddl_executor::DdlExecutor;
use super::dml_executor::DmlExecutor;
use super::result::{ExecutionOutput, QueryResult};

/// Compiled PQL statement.
///
/// Column family and row commands record the keyspace that was selected when
/// they were compiled; `None` means no keyspace was selected and the command
/// fails with `DataNotFound` when executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateKeySpace {
        name: String,
    },
    DropKeySpace {
        name: String,
    },
    UseKeySpace {
        name: String,
    },
    CreateColumnFamily {
        name: String,
        key_space: Option<String>,
    },
    DropColumnFamily {
        name: String,
        key_space: Option<String>,
    },
    Insert {
        column_family: String,
        key_space: Option<String>,
        row_key: ByteKey,
        keys: Vec<ByteKey>,
        values: Vec<ValueBytes>,
    },
    Update {
        column_family: String,
        key_space: Option<String>,
        row_key: ByteKey,
        keys: Vec<ByteKey>,
        values: Vec<ValueBytes>,
    },
    Select {
        column_family: String,
        key_space: Option<String>,
        row_key: ByteKey,
    },
    Delete {
        column_family: String,
        key_space: Option<String>,
        row_key: ByteKey,
    },
}

impl Command {
    /// Run the command. Every check happens before the first mutation, so a
    /// failed command leaves the registry untouched.
    pub fn execute(&self, registry: &Registry, ctx: &mut ExecutionContext) -> QueryResult<Option<ExecutionOutput>> {
        let ddl = DdlExecutor::new(registry);
        let dml = DmlExecutor::new(registry);

        match self {
            Command::CreateKeySpace { name } => ddl.create_key_space(name).map(|_| None),
            Command::DropKeySpace { name } => ddl.drop_key_space(name).map(|_| None),
            Command::UseKeySpace { name } => {
                let space = ddl.use_key_space(name, ctx)?;
                Ok(Some(ExecutionOutput::KeySpace(space.name().to_string())))
            }
            Command::CreateColumnFamily { name, key_space } => {
                ddl.create_column_family(key_space.as_deref(), name).map(|_| None)
            }
            Command::DropColumnFamily { name, key_space } => {
                ddl.drop_column_family(key_space.as_deref(), name).map(|_| None)
            }
            Command::Insert {
                column_family,
                key_space,
                row_key,
                keys,
                values,
            } => dml
                .insert(key_space.as_deref(), column_family, row_key, keys, values)
                .map(|_| None),
            Command::Update {
                column_family,
                key_space,
                row_key,
                keys,
                values,
            } => dml
                .update(key_space.as_deref(), column_family, row_key, keys, values)
                .map(|_| None),
            Command::Select {
                column_family,
                key_space,
                row_key,
            } => Ok(dml
                .select(key_space.as_deref(), column_family, row_key)?
                .map(ExecutionOutput::Row)),
            Command::Delete {
                column_family,
                key_space,
                row_key,
            } => dml.delete(key_space.as_deref(), column_family, row_key).map(|_| None),
        }
    }

    /// True for commands that can change the registry
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::UseKeySpace { .. } | Command::Select { .. })
    }

    /// Statement keyword, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateKeySpace { .. } => "KEYSPACE",
            Command::DropKeySpace { .. } => "KILL",
            Command::UseKeySpace { .. } => "USE",
            Command::CreateColumnFamily { .. } => "CREATE COLUMNFAMILY",
            Command::DropColumnFamily { .. } => "DROP COLUMNFAMILY",
            Command::Insert { .. } => "INSERT",
            Command::Update { .. } => "UPDATE",
            Command::Select { .. } => "SELECT",
            Command::Delete { .. } => "DELETE",
        }
    }
}

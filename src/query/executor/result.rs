// Command Result Implementation
//
// This module defines the result and error types for command execution.

use std::fmt;

use thiserror::Error;

use crate::catalog::Row;
use crate::query::parser::ParseError;

/// Errors raised while compiling or executing a statement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Lexical or syntax error, the statement never became a command
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// Name or key already taken in its parent collection
    #[error("Key already exists: {0}")]
    KeyAlreadyExists(String),
    /// Keyspace, column family or row does not exist
    #[error("Data not found: {0}")]
    DataNotFound(String),
    /// Arguments rejected before touching any data
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    /// Parse tree shape has no matching interpreter handler
    #[error("Interpreter not found: {0}")]
    InterpreterNotFound(String),
}

impl QueryError {
    /// Semantic errors leave state untouched and the connection usable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QueryError::KeyAlreadyExists(_) | QueryError::DataNotFound(_) | QueryError::InvalidArguments(_)
        )
    }
}

/// Result type for compile and execute operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Value produced by a successfully executed command
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutput {
    /// Keyspace selected by USE
    KeySpace(String),
    /// Detached copy of the row returned by SELECT
    Row(Row),
}

impl ExecutionOutput {
    pub fn as_row(&self) -> Option<&Row> {
        match self {
            ExecutionOutput::Row(row) => Some(row),
            ExecutionOutput::KeySpace(_) => None,
        }
    }

    /// Text sent back to the client, if this output is shown at all.
    /// Selecting a keyspace is acknowledged by the OK line alone.
    pub fn render(&self) -> Option<String> {
        match self {
            ExecutionOutput::Row(row) => Some(row.to_string()),
            ExecutionOutput::KeySpace(_) => None,
        }
    }
}

impl fmt::Display for ExecutionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutput::KeySpace(name) => write!(f, "KeySpace({})", name),
            ExecutionOutput::Row(row) => write!(f, "{}", row),
        }
    }
}

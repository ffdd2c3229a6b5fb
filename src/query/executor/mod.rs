// Command Executor Module
//
// This module holds the compiled command set and runs commands against the
// registry on behalf of a connection.

pub mod command;
pub mod context;
pub mod ddl_executor;
pub mod dml_executor;
pub mod result;

// Export key types
pub use self::command::Command;
pub use self::context::ExecutionContext;
pub use self::ddl_executor::DdlExecutor;
pub use self::dml_executor::DmlExecutor;
pub use self::result::{ExecutionOutput, QueryError, QueryResult};

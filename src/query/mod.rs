// PQL Query Processing Module
//
// This module contains the statement compiler (lexer, parser, interpreter)
// and the command executor.

pub mod executor;
pub mod interpreter;
pub mod parser;

use log::debug;

use self::executor::command::Command;
use self::executor::context::ExecutionContext;
use self::interpreter::Interpreter;

// Export key public interfaces
pub use self::executor::result::{QueryError, QueryResult};
pub use self::parser::Parser;

/// Compile one statement into a command. Column family and row statements
/// capture the keyspace currently selected in `ctx`.
pub fn compile(line: &str, ctx: &ExecutionContext) -> QueryResult<Command> {
    let tree = Parser::new().parse_str(line)?;
    let command = Interpreter::interpret(&tree, ctx)?;
    debug!("Compiled {:?}", command);
    Ok(command)
}

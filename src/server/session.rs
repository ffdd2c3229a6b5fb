// Connection Session
//
// A session owns the execution context of one connection and turns each
// received line into the response lines sent back to the client.

use log::{debug, error, warn};

use crate::database::Database;
use crate::query::compile;
use crate::query::executor::context::ExecutionContext;
use crate::query::executor::result::{ExecutionOutput, QueryResult};

/// Line closing every response
pub const OK_LINE: &str = "OK";

/// Prefix of the line reporting a failed statement
pub const ERROR_PREFIX: &str = "ERROR: ";

pub struct Session {
    database: Database,
    ctx: ExecutionContext,
    flush_after_each_statement: bool,
}

impl Session {
    pub fn new(database: Database, flush_after_each_statement: bool) -> Self {
        Session {
            database,
            ctx: ExecutionContext::new(),
            flush_after_each_statement,
        }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Compile and run one statement
    pub fn execute(&mut self, line: &str) -> QueryResult<Option<ExecutionOutput>> {
        let command = compile(line, &self.ctx)?;
        let output = command.execute(self.database.registry(), &mut self.ctx)?;

        if self.flush_after_each_statement && command.is_mutation() {
            // The data stays dirty on failure and goes out with the next flush
            if let Err(e) = self.database.flush() {
                error!("Flush after {} failed: {}", command.name(), e);
            }
        }
        Ok(output)
    }

    /// Response lines for one received line: the rendered result, if any,
    /// or the error message, followed by the OK line.
    pub fn execute_line(&mut self, line: &str) -> Vec<String> {
        let mut response = Vec::with_capacity(2);
        match self.execute(line) {
            Ok(output) => {
                if let Some(text) = output.as_ref().and_then(ExecutionOutput::render) {
                    response.push(text);
                }
            }
            Err(e) => {
                if e.is_recoverable() {
                    debug!("Statement rejected: {}", e);
                } else {
                    warn!("Statement failed: {}", e);
                }
                response.push(format!("{}{}", ERROR_PREFIX, e));
            }
        }
        response.push(OK_LINE.to_string());
        response
    }
}

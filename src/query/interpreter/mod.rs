//! Parse Tree Interpreter
//!
//! Turns a parse tree into a [`Command`]. Each statement non-terminal has a
//! handler that reads the values of its direct children by position. Handlers
//! are looked up in a table built on first use.

mod ddl;
mod dml;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::query::executor::command::Command;
use crate::query::executor::context::ExecutionContext;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::parser::grammar::{NonTerminal, Symbol, Terminal};
use crate::query::parser::parse_tree::{NodeId, ParseTree};

type Handler = fn(&ParseTree, NodeId, &ExecutionContext) -> QueryResult<Command>;

static HANDLERS: Lazy<HashMap<NonTerminal, Handler>> = Lazy::new(|| {
    let mut handlers: HashMap<NonTerminal, Handler> = HashMap::new();
    handlers.insert(NonTerminal::Start, interpret_start);
    handlers.insert(NonTerminal::CreateKeySpace, ddl::create_key_space);
    handlers.insert(NonTerminal::DropKeySpace, ddl::drop_key_space);
    handlers.insert(NonTerminal::UseKeySpace, ddl::use_key_space);
    handlers.insert(NonTerminal::CreateColumnFamily, ddl::create_column_family);
    handlers.insert(NonTerminal::DropColumnFamily, ddl::drop_column_family);
    handlers.insert(NonTerminal::Insert, dml::insert);
    handlers.insert(NonTerminal::Update, dml::update);
    handlers.insert(NonTerminal::Select, dml::select);
    handlers.insert(NonTerminal::Delete, dml::delete);
    handlers
});

pub struct Interpreter;

impl Interpreter {
    /// Build the command described by `tree`
    pub fn interpret(tree: &ParseTree, ctx: &ExecutionContext) -> QueryResult<Command> {
        let root = tree
            .root()
            .ok_or_else(|| QueryError::InterpreterNotFound("empty parse tree".to_string()))?;
        dispatch(tree, root, ctx)
    }
}

fn dispatch(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    let handler = tree
        .non_terminal(node)
        .and_then(|non_terminal| HANDLERS.get(&non_terminal))
        .ok_or_else(|| QueryError::InterpreterNotFound(tree.symbol(node).to_string()))?;
    handler(tree, node, ctx)
}

fn interpret_start(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    let statement = tree
        .child(node, 0)
        .ok_or_else(|| QueryError::InterpreterNotFound("start has no statement".to_string()))?;

    match tree.non_terminal(statement) {
        Some(non_terminal) if NonTerminal::STATEMENTS.contains(&non_terminal) => dispatch(tree, statement, ctx),
        _ => Err(QueryError::InterpreterNotFound(tree.symbol(statement).to_string())),
    }
}

/// Literal of the token held by the child at `position`
fn value_at(tree: &ParseTree, node: NodeId, position: usize) -> QueryResult<String> {
    tree.child(node, position)
        .and_then(|child| tree.token(child))
        .map(|token| token.literal.clone())
        .ok_or_else(|| {
            QueryError::InterpreterNotFound(format!("{} has no value at position {}", tree.symbol(node), position))
        })
}

/// Child at `position`, which must be an inner node
fn subtree_at(tree: &ParseTree, node: NodeId, position: usize) -> QueryResult<NodeId> {
    tree.child(node, position)
        .filter(|child| tree.non_terminal(*child).is_some())
        .ok_or_else(|| {
            QueryError::InterpreterNotFound(format!("{} has no subtree at position {}", tree.symbol(node), position))
        })
}

/// Flatten a kvList subtree into `[KEY, rowKey, col1, val1, col2, val2, ...]`
fn flatten_key_values(tree: &ParseTree, node: NodeId, out: &mut Vec<String>) {
    for child in tree.children(node) {
        match tree.symbol(*child) {
            Symbol::Terminal(Terminal::Key | Terminal::Var) => {
                if let Some(token) = tree.token(*child) {
                    out.push(token.literal.clone());
                }
            }
            Symbol::Terminal(_) => {}
            Symbol::NonTerminal(_) => flatten_key_values(tree, *child, out),
        }
    }
}

// Keyspace and column family statement handlers

use crate::query::executor::command::Command;
use crate::query::executor::context::ExecutionContext;
use crate::query::executor::result::QueryResult;
use crate::query::parser::parse_tree::{NodeId, ParseTree};

use super::value_at;

// createKS := KEYSPACE VAR
pub(super) fn create_key_space(tree: &ParseTree, node: NodeId, _ctx: &ExecutionContext) -> QueryResult<Command> {
    Ok(Command::CreateKeySpace {
        name: value_at(tree, node, 1)?,
    })
}

// dropKS := KILL VAR
pub(super) fn drop_key_space(tree: &ParseTree, node: NodeId, _ctx: &ExecutionContext) -> QueryResult<Command> {
    Ok(Command::DropKeySpace {
        name: value_at(tree, node, 1)?,
    })
}

// useKS := USE VAR
pub(super) fn use_key_space(tree: &ParseTree, node: NodeId, _ctx: &ExecutionContext) -> QueryResult<Command> {
    Ok(Command::UseKeySpace {
        name: value_at(tree, node, 1)?,
    })
}

// createCF := CREATE COLUMNFAMILY VAR
pub(super) fn create_column_family(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    Ok(Command::CreateColumnFamily {
        name: value_at(tree, node, 2)?,
        key_space: ctx.key_space_name().map(String::from),
    })
}

// dropCF := DROP COLUMNFAMILY VAR
pub(super) fn drop_column_family(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    Ok(Command::DropColumnFamily {
        name: value_at(tree, node, 2)?,
        key_space: ctx.key_space_name().map(String::from),
    })
}

// Row statement handlers

use crate::common::types::{ByteKey, ValueBytes};
use crate::query::executor::command::Command;
use crate::query::executor::context::ExecutionContext;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::parser::parse_tree::{NodeId, ParseTree};

use super::{flatten_key_values, subtree_at, value_at};

/// Row key and parallel column key/value arrays of a kvList
struct KeyValues {
    row_key: ByteKey,
    keys: Vec<ByteKey>,
    values: Vec<ValueBytes>,
}

fn key_values(tree: &ParseTree, kv_list: NodeId) -> QueryResult<KeyValues> {
    let mut flat = Vec::new();
    flatten_key_values(tree, kv_list, &mut flat);

    let mut items = flat.into_iter();
    let (Some(_key), Some(row_key)) = (items.next(), items.next()) else {
        return Err(QueryError::InterpreterNotFound("kvList without row key".to_string()));
    };

    let mut keys = Vec::new();
    let mut values = Vec::new();
    for (index, item) in items.enumerate() {
        if index % 2 == 0 {
            keys.push(ByteKey::from(item));
        } else {
            values.push(item.into_bytes());
        }
    }

    Ok(KeyValues {
        row_key: ByteKey::from(row_key),
        keys,
        values,
    })
}

// insert := INSERT INTO VAR '(' kvList ')'
pub(super) fn insert(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    let column_family = value_at(tree, node, 2)?;
    let kv = key_values(tree, subtree_at(tree, node, 4)?)?;
    Ok(Command::Insert {
        column_family,
        key_space: ctx.key_space_name().map(String::from),
        row_key: kv.row_key,
        keys: kv.keys,
        values: kv.values,
    })
}

// update := UPDATE VAR SET kvList
pub(super) fn update(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    let column_family = value_at(tree, node, 1)?;
    let kv = key_values(tree, subtree_at(tree, node, 3)?)?;
    Ok(Command::Update {
        column_family,
        key_space: ctx.key_space_name().map(String::from),
        row_key: kv.row_key,
        keys: kv.keys,
        values: kv.values,
    })
}

// where := WHERE KEY '=' VAR
fn where_key(tree: &ParseTree, node: NodeId) -> QueryResult<ByteKey> {
    let clause = subtree_at(tree, node, 3)?;
    Ok(ByteKey::from(value_at(tree, clause, 3)?))
}

// select := SELECT FROM VAR where
pub(super) fn select(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    Ok(Command::Select {
        column_family: value_at(tree, node, 2)?,
        key_space: ctx.key_space_name().map(String::from),
        row_key: where_key(tree, node)?,
    })
}

// delete := DELETE FROM VAR where
pub(super) fn delete(tree: &ParseTree, node: NodeId, ctx: &ExecutionContext) -> QueryResult<Command> {
    Ok(Command::Delete {
        column_family: value_at(tree, node, 2)?,
        key_space: ctx.key_space_name().map(String::from),
        row_key: where_key(tree, node)?,
    })
}

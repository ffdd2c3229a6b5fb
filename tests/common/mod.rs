#![allow(dead_code)]

use anyhow::{Result, anyhow};
use pqlstore::{Command, Database, ExecutionContext, ExecutionOutput, Registry, compile};
use tempfile::TempDir;

// Create a database rooted in a fresh temporary directory
pub fn create_test_database() -> Result<(Database, TempDir)> {
    let dir = TempDir::new()?;
    let db = Database::new(dir.path());
    Ok((db, dir))
}

// Compile and execute one statement against a registry
pub fn run(registry: &Registry, ctx: &mut ExecutionContext, statement: &str) -> Result<Option<ExecutionOutput>> {
    let command: Command = compile(statement, ctx)?;
    Ok(command.execute(registry, ctx)?)
}

// Run statements that are all expected to succeed
pub fn run_all(registry: &Registry, ctx: &mut ExecutionContext, statements: &[&str]) -> Result<()> {
    for statement in statements {
        run(registry, ctx, statement).map_err(|e| anyhow!("{}: {}", statement, e))?;
    }
    Ok(())
}

// Registry with keyspace Test selected in ctx and column family Users in it
pub fn setup_users() -> Result<(Registry, ExecutionContext)> {
    let registry = Registry::new();
    let mut ctx = ExecutionContext::new();
    run_all(
        &registry,
        &mut ctx,
        &["KEYSPACE Test", "USE Test", "CREATE COLUMNFAMILY Users"],
    )?;
    Ok((registry, ctx))
}

// Generate a random letters-only identifier usable as a bare PQL word
pub fn random_word(rng: &mut impl rand::Rng, len: usize) -> String {
    (0..len)
        .map(|_| {
            let offset = rng.gen_range(0..26u8);
            if rng.gen_bool(0.5) { (b'a' + offset) as char } else { (b'A' + offset) as char }
        })
        .collect()
}

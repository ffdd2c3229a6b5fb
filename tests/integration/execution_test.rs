use anyhow::Result;
use pqlstore::{ExecutionContext, ExecutionOutput, QueryError, Registry};

#[path = "../common/mod.rs"]
mod common;
use common::{run, run_all, setup_users};

fn expect_err(registry: &Registry, ctx: &mut ExecutionContext, statement: &str) -> QueryError {
    match run(registry, ctx, statement) {
        Ok(output) => panic!("{} unexpectedly succeeded with {:?}", statement, output),
        Err(e) => e.downcast::<QueryError>().expect("query error"),
    }
}

#[test]
fn test_end_to_end_session() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;

    run(&registry, &mut ctx, "INSERT INTO Users(KEY=pepe,name=Piotr)")?;
    let output = run(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=pepe")?.expect("row");
    let row = output.as_row().expect("row output");
    assert_eq!(row.key().as_bytes(), b"pepe");
    assert_eq!(row.column_count(), 1);
    assert_eq!(row.get_value(b"name"), Some(b"Piotr".to_vec()));

    run(&registry, &mut ctx, "DELETE FROM Users WHERE KEY=pepe")?;
    let err = expect_err(&registry, &mut ctx, "DELETE FROM Users WHERE KEY=pepe");
    assert!(matches!(err, QueryError::DataNotFound(_)));
    Ok(())
}

#[test]
fn test_round_trip_bytes() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    run(
        &registry,
        &mut ctx,
        r#"INSERT INTO Users(KEY="k 1",a="x y z",b="!@#$%^&*")"#,
    )?;

    let row = registry
        .get_key_space("Test")
        .and_then(|ks| ks.get_column_family("Users"))
        .and_then(|cf| cf.get_row(b"k 1"))
        .expect("row stored");
    assert_eq!(row.get_value(b"a"), Some(b"x y z".to_vec()));
    assert_eq!(row.get_value(b"b"), Some(b"!@#$%^&*".to_vec()));
    Ok(())
}

#[test]
fn test_use_output_and_context() -> Result<()> {
    let registry = Registry::new();
    let mut ctx = ExecutionContext::new();
    run(&registry, &mut ctx, "KEYSPACE Test")?;

    let output = run(&registry, &mut ctx, "USE Test")?;
    assert_eq!(output, Some(ExecutionOutput::KeySpace("Test".into())));
    assert_eq!(ctx.key_space_name(), Some("Test"));

    let err = expect_err(&registry, &mut ctx, "USE Missing");
    assert!(matches!(err, QueryError::DataNotFound(_)));
    assert_eq!(ctx.key_space_name(), Some("Test"));
    Ok(())
}

#[test]
fn test_commands_without_selected_keyspace() -> Result<()> {
    let registry = Registry::new();
    let mut ctx = ExecutionContext::new();
    run(&registry, &mut ctx, "KEYSPACE Test")?;

    for statement in [
        "CREATE COLUMNFAMILY Users",
        "DROP COLUMNFAMILY Users",
        "INSERT INTO Users(KEY=pepe)",
        "UPDATE Users SET KEY=pepe",
        "SELECT FROM Users WHERE KEY=pepe",
        "DELETE FROM Users WHERE KEY=pepe",
    ] {
        let err = expect_err(&registry, &mut ctx, statement);
        assert!(matches!(err, QueryError::DataNotFound(_)), "{}", statement);
    }
    Ok(())
}

#[test]
fn test_duplicate_creation_keeps_existing() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    run(&registry, &mut ctx, "INSERT INTO Users(KEY=pepe,name=Piotr)")?;

    assert!(matches!(
        expect_err(&registry, &mut ctx, "KEYSPACE Test"),
        QueryError::KeyAlreadyExists(_)
    ));
    assert!(matches!(
        expect_err(&registry, &mut ctx, "CREATE COLUMNFAMILY Users"),
        QueryError::KeyAlreadyExists(_)
    ));

    let output = run(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=pepe")?;
    assert!(output.is_some());
    Ok(())
}

#[test]
fn test_failures_leave_state_unchanged() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    run(&registry, &mut ctx, "INSERT INTO Users(KEY=pepe,name=Piotr)")?;

    let space = registry.get_key_space("Test").expect("keyspace");
    let family = space.get_column_family("Users").expect("column family");
    space.mark_clean();
    family.mark_clean();
    let before = family.snapshot();

    let failing = [
        "KEYSPACE Test",
        "KILL Missing",
        "USE Missing",
        "CREATE COLUMNFAMILY Users",
        "DROP COLUMNFAMILY Missing",
        "INSERT INTO Missing(KEY=pepe,name=x)",
        r#"INSERT INTO Users(KEY="",name=x)"#,
        "UPDATE Users SET KEY=nobody,name=x",
        "UPDATE Missing SET KEY=pepe,name=x",
        "DELETE FROM Users WHERE KEY=nobody",
        "SELECT FROM Missing WHERE KEY=pepe",
    ];
    for statement in failing {
        expect_err(&registry, &mut ctx, statement);
    }

    assert_eq!(family.snapshot(), before);
    assert!(!space.is_dirty());
    assert!(!family.is_dirty());
    assert_eq!(registry.len(), 1);
    assert!(registry.take_pending_deletions().is_empty());
    Ok(())
}

#[test]
fn test_select_missing_row_is_absent() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    assert_eq!(run(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=nobody")?, None);
    // Update on the same missing row is an error
    assert!(matches!(
        expect_err(&registry, &mut ctx, "UPDATE Users SET KEY=nobody,name=x"),
        QueryError::DataNotFound(_)
    ));
    Ok(())
}

#[test]
fn test_insert_overwrites_update_appends() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    run_all(
        &registry,
        &mut ctx,
        &[
            "INSERT INTO Users(KEY=pepe,name=Piotr)",
            "INSERT INTO Users(KEY=pepe,name=Pepe)",
            "UPDATE Users SET KEY=pepe,city=Krakow",
        ],
    )?;

    let output = run(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=pepe")?.expect("row");
    assert_eq!(output.to_string(), r#"{"pepe":{"city":"Krakow","name":"Pepe"}}"#);
    Ok(())
}

#[test]
fn test_dirty_flag_lifecycle() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    let space = registry.get_key_space("Test").expect("keyspace");
    let family = space.get_column_family("Users").expect("column family");
    assert!(space.is_dirty());
    assert!(family.is_dirty());

    // Simulated flush
    space.mark_clean();
    family.mark_clean();

    run(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=pepe")?;
    assert!(!family.is_dirty());

    run(&registry, &mut ctx, "INSERT INTO Users(KEY=pepe,name=Piotr)")?;
    assert!(family.is_dirty());
    assert!(!space.is_dirty());

    run(&registry, &mut ctx, "CREATE COLUMNFAMILY Orders")?;
    assert!(space.is_dirty());
    Ok(())
}

#[test]
fn test_drops_are_recorded_for_storage() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    run_all(
        &registry,
        &mut ctx,
        &["DROP COLUMNFAMILY Users", "KEYSPACE Other", "KILL Other"],
    )?;

    let pending = registry.take_pending_deletions();
    assert_eq!(pending.key_spaces, vec!["Other".to_string()]);
    assert_eq!(pending.column_families.get("Test"), Some(&vec!["Users".to_string()]));
    Ok(())
}

#[test]
fn test_dropped_selected_keyspace() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    run(&registry, &mut ctx, "KILL Test")?;

    let err = expect_err(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=pepe");
    assert!(matches!(err, QueryError::DataNotFound(_)));

    // Recreating the keyspace makes the selection usable again, by name
    run_all(&registry, &mut ctx, &["KEYSPACE Test", "CREATE COLUMNFAMILY Users"])?;
    assert_eq!(run(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=pepe")?, None);
    Ok(())
}

use anyhow::Result;
use pqlstore::catalog::RowRecord;
use pqlstore::storage::{StorageError, StorageStats};
use pqlstore::{ByteKey, Column, Database, ExecutionContext, Registry, SnapshotStorage, Storage};
use std::fs;
use tempfile::TempDir;

#[path = "../common/mod.rs"]
mod common;
use common::{create_test_database, run, run_all};

fn populate(db: &Database) -> Result<()> {
    let mut ctx = ExecutionContext::new();
    run_all(
        db.registry(),
        &mut ctx,
        &[
            "KEYSPACE Test",
            "USE Test",
            "CREATE COLUMNFAMILY Users",
            "CREATE COLUMNFAMILY Orders",
            "INSERT INTO Users(KEY=pepe,name=Piotr,city=Krakow)",
            r#"INSERT INTO Users(KEY="john doe",name=John)"#,
            "INSERT INTO Orders(KEY=first,item=book)",
        ],
    )
}

#[test]
fn test_flush_and_reload() -> Result<()> {
    let (db, dir) = create_test_database()?;
    populate(&db)?;

    let stats = db.flush()?;
    assert_eq!(stats.key_spaces, 1);
    assert_eq!(stats.column_families, 2);

    let reloaded = Database::open(dir.path())?;
    let space = reloaded.registry().get_key_space("Test").expect("keyspace reloaded");
    assert!(!space.is_dirty());
    assert_eq!(space.column_family_count(), 2);

    let users = space.get_column_family("Users").expect("users reloaded");
    assert!(!users.is_dirty());
    assert_eq!(users.row_count(), 2);

    let original = db
        .registry()
        .get_key_space("Test")
        .and_then(|ks| ks.get_column_family("Users"))
        .expect("users");
    assert_eq!(users.snapshot(), original.snapshot());

    let mut ctx = ExecutionContext::new();
    run(reloaded.registry(), &mut ctx, "USE Test")?;
    let output = run(reloaded.registry(), &mut ctx, r#"SELECT FROM Users WHERE KEY="john doe""#)?;
    assert_eq!(output.expect("row").to_string(), r#"{"john doe":{"name":"John"}}"#);
    Ok(())
}

#[test]
fn test_only_dirty_items_are_written() -> Result<()> {
    let (db, _dir) = create_test_database()?;
    populate(&db)?;
    db.flush()?;

    let mut ctx = ExecutionContext::new();
    run_all(db.registry(), &mut ctx, &["USE Test", "INSERT INTO Orders(KEY=second,item=pen)"])?;

    let stats = db.flush()?;
    assert_eq!(
        stats,
        StorageStats {
            key_spaces: 0,
            column_families: 1,
            deleted: 0,
        }
    );
    assert_eq!(db.flush()?, StorageStats::default());
    Ok(())
}

#[test]
fn test_drops_are_deleted_on_flush() -> Result<()> {
    let (db, dir) = create_test_database()?;
    populate(&db)?;
    db.flush()?;

    let orders = SnapshotStorage::column_family_file(dir.path(), "Test", "Orders");
    assert!(orders.exists());

    let mut ctx = ExecutionContext::new();
    run_all(db.registry(), &mut ctx, &["USE Test", "DROP COLUMNFAMILY Orders"])?;
    let stats = db.flush()?;
    assert_eq!(stats.deleted, 1);
    assert!(!orders.exists());
    assert!(SnapshotStorage::column_family_file(dir.path(), "Test", "Users").exists());

    run(db.registry(), &mut ctx, "KILL Test")?;
    db.flush()?;
    assert!(!SnapshotStorage::key_space_dir(dir.path(), "Test").exists());

    let reloaded = Database::open(dir.path())?;
    assert!(reloaded.registry().is_empty());
    Ok(())
}

#[test]
fn test_failed_deletion_keeps_remaining_drops() -> Result<()> {
    let (db, dir) = create_test_database()?;
    let mut ctx = ExecutionContext::new();
    run_all(
        db.registry(),
        &mut ctx,
        &[
            "KEYSPACE A",
            "KEYSPACE B",
            "USE B",
            "CREATE COLUMNFAMILY Users",
            "CREATE COLUMNFAMILY Orders",
        ],
    )?;
    db.flush()?;

    run_all(db.registry(), &mut ctx, &["DROP COLUMNFAMILY Orders", "KILL A", "KILL B"])?;

    // A plain file where A's directory was makes its removal fail
    let a_dir = SnapshotStorage::key_space_dir(dir.path(), "A");
    fs::remove_dir_all(&a_dir)?;
    fs::write(&a_dir, b"in the way")?;
    assert!(matches!(db.flush(), Err(StorageError::Io(_))));
    assert!(SnapshotStorage::key_space_dir(dir.path(), "B").exists());

    fs::remove_file(&a_dir)?;
    let stats = db.flush()?;
    assert_eq!(stats.deleted, 1);
    assert!(!SnapshotStorage::key_space_dir(dir.path(), "B").exists());
    assert_eq!(db.flush()?, StorageStats::default());

    let reloaded = Database::open(dir.path())?;
    assert!(reloaded.registry().is_empty());
    Ok(())
}

#[test]
fn test_drop_and_recreate_before_flush() -> Result<()> {
    let (db, dir) = create_test_database()?;
    populate(&db)?;
    db.flush()?;

    let mut ctx = ExecutionContext::new();
    run_all(
        db.registry(),
        &mut ctx,
        &[
            "KILL Test",
            "KEYSPACE Test",
            "USE Test",
            "CREATE COLUMNFAMILY Users",
            "INSERT INTO Users(KEY=fresh,name=New)",
        ],
    )?;
    db.flush()?;

    let reloaded = Database::open(dir.path())?;
    let space = reloaded.registry().get_key_space("Test").expect("keyspace");
    assert_eq!(space.column_family_count(), 1);
    let users = space.get_column_family("Users").expect("users");
    assert_eq!(users.row_count(), 1);
    assert!(users.get_row(b"fresh").is_some());
    Ok(())
}

#[test]
fn test_empty_keyspace_survives_reload() -> Result<()> {
    let (db, dir) = create_test_database()?;
    let mut ctx = ExecutionContext::new();
    run(db.registry(), &mut ctx, "KEYSPACE Empty")?;
    db.flush()?;

    let reloaded = Database::open(dir.path())?;
    let space = reloaded.registry().get_key_space("Empty").expect("keyspace");
    assert_eq!(space.column_family_count(), 0);
    Ok(())
}

#[test]
fn test_corrupt_file_reported() -> Result<()> {
    let dir = TempDir::new()?;
    let family_dir = SnapshotStorage::key_space_dir(dir.path(), "Test");
    fs::create_dir_all(&family_dir)?;

    let record = RowRecord {
        key: ByteKey::from("pepe"),
        columns: vec![Column::with_value("name", "Piotr")],
    };
    let bytes = bincode::serialize(&vec![record.clone(), record])?;
    fs::write(SnapshotStorage::column_family_file(dir.path(), "Test", "Users"), bytes)?;

    let registry = Registry::new();
    let result = SnapshotStorage::new().read(dir.path(), &registry);
    assert!(matches!(result, Err(StorageError::Corrupt(_))));

    fs::write(SnapshotStorage::column_family_file(dir.path(), "Test", "Users"), b"garbage")?;
    let result = SnapshotStorage::new().read(dir.path(), &Registry::new());
    assert!(matches!(result, Err(StorageError::Encoding(_))));
    Ok(())
}

#[test]
fn test_foreign_entries_are_skipped() -> Result<()> {
    let (db, dir) = create_test_database()?;
    populate(&db)?;
    db.flush()?;

    fs::create_dir_all(dir.path().join("not-hex"))?;
    fs::write(dir.path().join("README"), b"notes")?;
    fs::write(SnapshotStorage::key_space_dir(dir.path(), "Test").join("leftover.tmp"), b"partial")?;

    let reloaded = Database::open(dir.path())?;
    assert_eq!(reloaded.registry().len(), 1);
    assert_eq!(
        reloaded
            .registry()
            .get_key_space("Test")
            .map(|ks| ks.column_family_count()),
        Some(2)
    );
    Ok(())
}

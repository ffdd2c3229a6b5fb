use anyhow::Result;
use pqlstore::{ExecutionContext, Registry};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

#[path = "../common/mod.rs"]
mod common;
use common::{create_test_database, random_word, run, run_all, setup_users};

const WORKERS: usize = 8;
const ROWS_PER_WORKER: usize = 200;

fn worker_keys(seed_words: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut keys = HashSet::new();
    while keys.len() < seed_words {
        keys.insert(random_word(&mut rng, 12));
    }
    keys.into_iter().collect()
}

#[test]
fn test_parallel_inserts_on_independent_rows() -> Result<()> {
    let (registry, _) = setup_users()?;
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || -> Result<Vec<String>> {
                let mut ctx = ExecutionContext::new();
                run(&registry, &mut ctx, "USE Test")?;
                let keys: Vec<String> = worker_keys(ROWS_PER_WORKER)
                    .into_iter()
                    .map(|k| format!("w{}{}", (b'a' + worker as u8) as char, k))
                    .collect();
                for key in &keys {
                    run(&registry, &mut ctx, &format!("INSERT INTO Users(KEY={},owner=worker)", key))?;
                }
                Ok(keys)
            })
        })
        .collect();

    let mut all_keys = Vec::new();
    for handle in handles {
        all_keys.extend(handle.join().expect("worker panicked")?);
    }

    let family = registry
        .get_key_space("Test")
        .and_then(|ks| ks.get_column_family("Users"))
        .expect("column family");
    assert_eq!(family.row_count(), WORKERS * ROWS_PER_WORKER);
    for key in &all_keys {
        let row = family.get_row(key.as_bytes()).expect("row present");
        assert_eq!(row.get_value(b"owner"), Some(b"worker".to_vec()));
    }
    Ok(())
}

#[test]
fn test_parallel_updates_to_one_row() -> Result<()> {
    let (registry, mut ctx) = setup_users()?;
    run(&registry, &mut ctx, "INSERT INTO Users(KEY=shared)")?;
    let registry = Arc::new(registry);

    let columns: Vec<String> = worker_keys(WORKERS);
    let handles: Vec<_> = columns
        .iter()
        .cloned()
        .map(|column| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || -> Result<()> {
                let mut ctx = ExecutionContext::new();
                run(&registry, &mut ctx, "USE Test")?;
                for _ in 0..50 {
                    let value = random_word(&mut rand::thread_rng(), 4);
                    run(&registry, &mut ctx, &format!("UPDATE Users SET KEY=shared,{}={}", column, value))?;
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked")?;
    }

    let mut ctx = ExecutionContext::new();
    run(&registry, &mut ctx, "USE Test")?;
    let output = run(&registry, &mut ctx, "SELECT FROM Users WHERE KEY=shared")?.expect("row");
    assert_eq!(output.as_row().map(|row| row.column_count()), Some(WORKERS));
    Ok(())
}

#[test]
fn test_keyspace_creation_race_has_one_winner() -> Result<()> {
    let registry = Arc::new(Registry::new());

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mut ctx = ExecutionContext::new();
                run(&registry, &mut ctx, "KEYSPACE Contended").is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().expect("worker panicked"))
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
    assert_eq!(registry.len(), 1);
    Ok(())
}

#[test]
fn test_flush_concurrent_with_writes() -> Result<()> {
    let (db, dir) = create_test_database()?;
    let mut ctx = ExecutionContext::new();
    run_all(db.registry(), &mut ctx, &["KEYSPACE Test", "USE Test", "CREATE COLUMNFAMILY Users"])?;

    let writer_db = db.clone();
    let writer = thread::spawn(move || -> Result<()> {
        let mut ctx = ExecutionContext::new();
        run(writer_db.registry(), &mut ctx, "USE Test")?;
        let mut rng = rand::thread_rng();
        for i in 0..300 {
            let key = random_word(&mut rng, 10);
            run(
                writer_db.registry(),
                &mut ctx,
                &format!("INSERT INTO Users(KEY={},n=\"{}\")", key, i),
            )?;
        }
        Ok(())
    });

    let flusher_db = db.clone();
    let flusher = thread::spawn(move || -> Result<()> {
        for _ in 0..20 {
            flusher_db.flush()?;
            thread::yield_now();
        }
        Ok(())
    });

    writer.join().expect("writer panicked")?;
    flusher.join().expect("flusher panicked")?;

    // Whatever the interleaving, a last flush persists every row
    db.flush()?;
    let live = db
        .registry()
        .get_key_space("Test")
        .and_then(|ks| ks.get_column_family("Users"))
        .expect("users");

    let reloaded = pqlstore::Database::open(dir.path())?;
    let stored = reloaded
        .registry()
        .get_key_space("Test")
        .and_then(|ks| ks.get_column_family("Users"))
        .expect("users reloaded");
    assert_eq!(stored.snapshot(), live.snapshot());
    Ok(())
}

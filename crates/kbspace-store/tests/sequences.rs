//! Sequence allocator behavior against a real database file.
//!
//! These tests exercise what the in-memory SQLite tests cannot: values that
//! survive a restart, rolled-back writers from another connection, and lock
//! contention with a short busy timeout.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use kbspace_core::SequenceName;
use kbspace_store::{SqliteStore, Store, StoreError, StoreOptions};
use rusqlite::Connection;
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("access.db")
}

#[tokio::test]
async fn test_values_survive_restart() {
    let dir = TempDir::new().unwrap();
    let name = SequenceName::knowledge_base();

    {
        let store = SqliteStore::open(db_path(&dir)).unwrap();
        assert_eq!(store.next_value(&name).await.unwrap(), 1);
        assert_eq!(store.next_value(&name).await.unwrap(), 2);
    }

    let store = SqliteStore::open(db_path(&dir)).unwrap();
    assert_eq!(store.current_value(&name).await.unwrap(), Some(2));
    assert_eq!(store.next_value(&name).await.unwrap(), 3);
}

#[tokio::test]
async fn test_uncommitted_increment_is_not_observed() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(db_path(&dir)).unwrap();
    let name = SequenceName::knowledge_base();

    assert_eq!(store.next_value(&name).await.unwrap(), 1);
    assert_eq!(store.next_value(&name).await.unwrap(), 2);

    // Another writer bumps the counter and dies before committing.
    {
        let mut other = Connection::open(db_path(&dir)).unwrap();
        let tx = other.transaction().unwrap();
        tx.execute(
            "UPDATE sequences SET current_value = current_value + 1 WHERE name = ?1",
            [name.as_str()],
        )
        .unwrap();
        drop(tx);
    }

    assert_eq!(store.next_value(&name).await.unwrap(), 3);
}

#[tokio::test]
async fn test_locked_database_fails_allocation() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open_with(
        db_path(&dir),
        StoreOptions {
            busy_timeout: Duration::from_millis(50),
            ..StoreOptions::default()
        },
    )
    .unwrap();
    let name = SequenceName::knowledge_base();
    assert_eq!(store.next_value(&name).await.unwrap(), 1);

    let other = Connection::open(db_path(&dir)).unwrap();
    other.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let err = store.next_value(&name).await.unwrap_err();
    assert!(matches!(err, StoreError::AllocationFailed { .. }));
    assert!(err.is_retryable());

    other.execute_batch("COMMIT;").unwrap();

    // The failed call handed nothing out, so no value is skipped.
    assert_eq!(store.next_value(&name).await.unwrap(), 2);
}

#[tokio::test]
async fn test_exhausted_sequence_is_not_retryable() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open_with(
        db_path(&dir),
        StoreOptions {
            sequence_base: i64::MAX,
            ..StoreOptions::default()
        },
    )
    .unwrap();
    let name = SequenceName::knowledge_base();

    assert_eq!(store.next_value(&name).await.unwrap(), i64::MAX);
    let err = store.next_value(&name).await.unwrap_err();
    assert!(matches!(err, StoreError::SequenceExhausted(_)));
    assert!(!err.is_retryable());
    assert_eq!(store.current_value(&name).await.unwrap(), Some(i64::MAX));
}

#[tokio::test]
async fn test_corrupt_sequence_row_is_not_retryable() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(db_path(&dir)).unwrap();
    let name = SequenceName::knowledge_base();
    assert_eq!(store.next_value(&name).await.unwrap(), 1);

    let other = Connection::open(db_path(&dir)).unwrap();
    other
        .execute("UPDATE sequences SET current_value = 1.5 WHERE name = ?1", [name.as_str()])
        .unwrap();
    drop(other);

    let err = store.next_value(&name).await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::AllocationFailed {
            retryable: false,
            ..
        }
    ));
    assert!(!err.is_retryable());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_are_distinct() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::open(db_path(&dir)).unwrap());
    let name = SequenceName::knowledge_base();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let store = Arc::clone(&store);
            let name = name.clone();
            tokio::spawn(async move { store.next_value(&name).await.unwrap() })
        })
        .collect();

    let mut values = HashSet::new();
    for handle in handles {
        assert!(values.insert(handle.await.unwrap()), "duplicate value");
    }
    let expected: HashSet<i64> = (1..=32).collect();
    assert_eq!(values, expected);
}

#[tokio::test]
async fn test_registry_survives_restart() {
    use kbspace_core::{Grant, Role};
    use kbspace_store::StoreExt;

    let dir = TempDir::new().unwrap();
    {
        let store = SqliteStore::open(db_path(&dir)).unwrap();
        store.seed_catalog().await.unwrap();
        store.create_role(&Role::new("Editor", "Editor")).await.unwrap();
        store
            .set_grant(&Grant::new("Editor", "content.kb", "CREATE"))
            .await
            .unwrap();
    }

    let store = SqliteStore::open(db_path(&dir)).unwrap();
    let grants = store.list_grants_for_role(&"Editor".into()).await.unwrap();
    assert_eq!(grants, vec![Grant::new("Editor", "content.kb", "CREATE")]);
}

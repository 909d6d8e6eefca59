//! End-to-end behavior of the access-control service over SQLite.

use async_trait::async_trait;
use kbspace::perms::operation;
use kbspace::store::{SqliteStore, Store};
use kbspace::{
    AccessConfig, AccessControl, AccessError, DatabaseConfig, Decision, Grant, KnowledgeBase,
    KnowledgeBaseDraft, KnowledgeBaseSink, Role, SequenceName,
};
use kbspace_testkit::RecordingSink;
use tempfile::TempDir;

struct FailingSink;

#[async_trait]
impl KnowledgeBaseSink for FailingSink {
    async fn persist(&self, _article: &KnowledgeBase) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

async fn service_with_editor() -> AccessControl<SqliteStore> {
    let access = AccessControl::open(AccessConfig::default()).await.unwrap();
    access
        .store()
        .create_role(&Role::new("Editor", "Editor"))
        .await
        .unwrap();
    access
        .store()
        .set_grant(&Grant::new("Editor", "content.kb", "CREATE"))
        .await
        .unwrap();
    access
}

#[tokio::test]
async fn test_editor_create_allowed_delete_forbidden() {
    let access = service_with_editor().await;
    let editor = access
        .issue_credential("alice", &["Editor".into()])
        .await
        .unwrap();

    assert_eq!(
        editor.claim_strings(),
        vec!["Permission.content.kb.CREATE".to_string()]
    );
    assert!(access
        .authorize(operation::KNOWLEDGE_BASES_CREATE, Some(&editor))
        .is_ok());

    let err = access
        .authorize(operation::KNOWLEDGE_BASES_DELETE, Some(&editor))
        .unwrap_err();
    assert!(matches!(err, AccessError::Forbidden { .. }));
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_two_roles_granting_same_pair_yield_one_claim() {
    let access = service_with_editor().await;
    access
        .store()
        .create_role(&Role::new("Author", "Author"))
        .await
        .unwrap();
    access
        .store()
        .set_grant(&Grant::new("Author", "content.kb", "CREATE"))
        .await
        .unwrap();

    let credential = access
        .issue_credential("alice", &["Editor".into(), "Author".into()])
        .await
        .unwrap();
    assert_eq!(credential.claims.len(), 1);
}

#[tokio::test]
async fn test_missing_credential_is_unauthenticated() {
    let access = service_with_editor().await;

    for op in [
        operation::KNOWLEDGE_BASES_CREATE,
        operation::COMMANDS_LIST,
        operation::FUNCTIONS_DELETE,
    ] {
        let err = access.authorize(op, None).unwrap_err();
        assert!(matches!(err, AccessError::Unauthenticated));
        assert_eq!(err.status_code(), 401);
    }
}

#[tokio::test]
async fn test_revocation_applies_to_next_issuance_only() {
    let access = service_with_editor().await;
    let before = access
        .issue_credential("alice", &["Editor".into()])
        .await
        .unwrap();

    access
        .store()
        .clear_grant(&Grant::new("Editor", "content.kb", "CREATE"))
        .await
        .unwrap();

    assert!(access
        .authorize(operation::KNOWLEDGE_BASES_CREATE, Some(&before))
        .is_ok());

    let after = access
        .issue_credential("alice", &["Editor".into()])
        .await
        .unwrap();
    assert!(matches!(
        access.authorize(operation::KNOWLEDGE_BASES_CREATE, Some(&after)),
        Err(AccessError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn test_expired_credential_is_unauthenticated() {
    let config = AccessConfig {
        credential_ttl_secs: Some(60),
        ..AccessConfig::default()
    };
    let access = AccessControl::open(config).await.unwrap();
    let credential = access.issue_credential("alice", &[]).await.unwrap();
    let expires = credential.expires_at.unwrap();

    assert!(access
        .authorize_at(operation::COMMANDS_LIST, Some(&credential), expires)
        .is_ok());
    assert_eq!(
        access.decide(operation::COMMANDS_LIST, Some(&credential), expires + 1),
        Decision::Unauthenticated
    );
}

#[tokio::test]
async fn test_knowledge_base_ids_come_from_sequence() {
    let access = service_with_editor().await;
    let editor = access
        .issue_credential("alice", &["Editor".into()])
        .await
        .unwrap();
    let sink = RecordingSink::new();

    let first = access
        .create_knowledge_base(
            Some(&editor),
            KnowledgeBaseDraft::new(1, "Build fails", "build-fails").with_labels("ci,rust"),
            &sink,
        )
        .await
        .unwrap();
    let second = access
        .create_knowledge_base(
            Some(&editor),
            KnowledgeBaseDraft::new(1, "Linker error", "linker-error"),
            &sink,
        )
        .await
        .unwrap();

    assert_eq!((first.id, second.id), (1, 2));
    assert_eq!(first.owner, "alice");
    let articles = sink.articles();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].draft.labels, vec!["ci", "rust"]);
}

#[tokio::test]
async fn test_forbidden_creation_allocates_nothing() {
    let access = service_with_editor().await;
    let reader = access.issue_credential("bob", &[]).await.unwrap();
    let sink = RecordingSink::new();

    let err = access
        .create_knowledge_base(Some(&reader), KnowledgeBaseDraft::new(1, "T", "t"), &sink)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 403);
    assert!(sink.articles().is_empty());
    assert_eq!(
        access
            .store()
            .current_value(&SequenceName::knowledge_base())
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn test_sink_failure_surfaces() {
    let access = service_with_editor().await;
    let editor = access
        .issue_credential("alice", &["Editor".into()])
        .await
        .unwrap();

    let err = access
        .create_knowledge_base(Some(&editor), KnowledgeBaseDraft::new(1, "T", "t"), &FailingSink)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::Sink(msg) if msg.contains("disk full")));
}

#[tokio::test]
async fn test_allocation_failure_skips_sink() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("access.db");
    let config = AccessConfig {
        database: DatabaseConfig {
            path: Some(path.clone()),
            busy_timeout_ms: 50,
        },
        ..AccessConfig::default()
    };
    let access = AccessControl::open(config).await.unwrap();
    access
        .store()
        .create_role(&Role::new("Editor", "Editor"))
        .await
        .unwrap();
    access
        .store()
        .set_grant(&Grant::new("Editor", "content.kb", "CREATE"))
        .await
        .unwrap();
    let editor = access
        .issue_credential("alice", &["Editor".into()])
        .await
        .unwrap();
    let sink = RecordingSink::new();

    let blocker = rusqlite_lock(&path);
    let err = access
        .create_knowledge_base(Some(&editor), KnowledgeBaseDraft::new(1, "T", "t"), &sink)
        .await
        .unwrap_err();
    drop(blocker);

    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 503);
    assert!(sink.articles().is_empty());

    // Retrying after the lock clears gets the first value.
    let article = access
        .create_knowledge_base(Some(&editor), KnowledgeBaseDraft::new(1, "T", "t"), &sink)
        .await
        .unwrap();
    assert_eq!(article.id, 1);
}

/// Hold an exclusive lock on the database until dropped.
fn rusqlite_lock(path: &std::path::Path) -> rusqlite::Connection {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch("BEGIN EXCLUSIVE;").unwrap();
    conn
}

//! Integration tests for download resolution.

mod helpers;

use uuid::Uuid;

use handout_core::ErrorKind;
use handout_database::store::RecordStore;
use handout_entity::audit::{AuditAction, NewAuditRecord};
use handout_entity::document::CreateDocument;
use handout_entity::version::NewVersion;
use handout_service::RequestContext;

use helpers::{TestEngine, user};

#[tokio::test]
async fn test_repeated_downloads_are_identical_and_each_audited() {
    let app = TestEngine::new().await;
    let owner = user();
    let version = app.upload(&owner, "Week 1", "w1.pdf", b"slides").await.unwrap();

    let first = app
        .engine
        .resolve_download(&owner, version.document_id, version.id)
        .await
        .unwrap();
    let second = app
        .engine
        .resolve_download(&owner, version.document_id, version.id)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.content_type, "application/pdf");
    assert_eq!(first.filename, "w1.pdf");
    assert_eq!(first.size_bytes, 6);

    let trail = app.store.list_audit(version.document_id, 10).await.unwrap();
    let downloads: Vec<_> = trail
        .iter()
        .filter(|r| r.action == AuditAction::Download)
        .collect();
    assert_eq!(downloads.len(), 2);
    assert_ne!(downloads[0].id, downloads[1].id);
    for record in downloads {
        assert_eq!(record.version_id, Some(version.id));
        assert_eq!(record.document_id, Some(version.document_id));
        assert_eq!(record.actor_id, Some(owner.user_id));
    }
}

#[tokio::test]
async fn test_stranger_is_forbidden_and_admin_allowed() {
    let app = TestEngine::new().await;
    let owner = user();
    let version = app.upload(&owner, "Private", "p.pdf", b"secret").await.unwrap();

    let err = app
        .engine
        .resolve_download(&user(), version.document_id, version.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let admin = RequestContext::admin(Uuid::new_v4(), None);
    assert!(
        app.engine
            .resolve_download(&admin, version.document_id, version.id)
            .await
            .is_ok()
    );

    // Upload plus the admin download; the refused attempt leaves no record.
    assert_eq!(app.store.audit_len().await, 2);
}

#[tokio::test]
async fn test_version_of_other_document_is_not_found() {
    let app = TestEngine::new().await;
    let owner = user();
    let a = app.upload(&owner, "A", "a.pdf", b"a").await.unwrap();
    let b = app.upload(&owner, "B", "b.pdf", b"b").await.unwrap();

    let err = app
        .engine
        .resolve_download(&owner, a.document_id, b.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = app
        .engine
        .resolve_download(&owner, a.document_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_missing_file_is_not_found_on_disk() {
    let app = TestEngine::new().await;
    let owner = user();
    let version = app.upload(&owner, "Gone", "g.pdf", b"bytes").await.unwrap();
    std::fs::remove_file(app.root.join(&version.storage_path)).unwrap();

    let err = app
        .engine
        .resolve_download(&owner, version.document_id, version.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFoundOnDisk);
    assert!(!err.message.contains(&*app.root.to_string_lossy()));
}

#[tokio::test]
async fn test_stored_path_outside_root_is_rejected_without_audit() {
    let app = TestEngine::new().await;
    let owner = user();
    let document = app
        .store
        .find_or_create_document(CreateDocument {
            owner_id: owner.user_id,
            title: "Tampered".into(),
            description: None,
        })
        .await
        .unwrap();
    let version_id = Uuid::new_v4();
    app.store
        .commit_version(
            NewVersion {
                id: version_id,
                document_id: document.id,
                version_number: 1,
                storage_path: "../../etc/passwd.pdf".into(),
                filename: "passwd.pdf".into(),
                content_type: "application/pdf".into(),
                checksum_sha256: "0".repeat(64),
                size_bytes: 1,
                uploaded_by: owner.user_id,
                changelog: None,
            },
            NewAuditRecord::new(AuditAction::Upload).document(document.id),
        )
        .await
        .unwrap();

    let err = app
        .engine
        .resolve_download(&owner, document.id, version_id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PathTraversal);

    let err = app
        .engine
        .resolve_public_download(document.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::PathTraversal);

    let trail = app.store.list_audit(document.id, 10).await.unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, AuditAction::Upload);
}

#[tokio::test]
async fn test_public_download_resolves_current_without_actor() {
    let app = TestEngine::new().await;
    let owner = user();
    app.upload(&owner, "Shared", "s.pdf", b"one").await.unwrap();
    let v2 = app.upload(&owner, "Shared", "s.pdf", b"two!").await.unwrap();

    let target = app
        .engine
        .resolve_public_download(v2.document_id, Some("198.51.100.4".into()))
        .await
        .unwrap();
    assert_eq!(target.size_bytes, 4);
    assert_eq!(target.checksum_sha256, v2.checksum_sha256);

    let latest = &app.store.list_audit(v2.document_id, 1).await.unwrap()[0];
    assert_eq!(latest.action, AuditAction::PublicDownload);
    assert_eq!(latest.actor_id, None);
    assert_eq!(latest.version_id, Some(v2.id));
    assert_eq!(latest.origin.as_deref(), Some("198.51.100.4"));
}

#[tokio::test]
async fn test_public_download_of_unknown_document_is_not_found() {
    let app = TestEngine::new().await;
    let err = app
        .engine
        .resolve_public_download(Uuid::new_v4(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

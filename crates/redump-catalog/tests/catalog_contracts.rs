//! Contract tests for CatalogService.
//!
//! These run against the in-memory fake; any conforming implementation
//! must behave the same way.

use redump_catalog::fakes::{CatalogCall, MemoryCatalog};
use redump_catalog::{CatalogError, CatalogRecord, CatalogService, CatalogSession};

const SHA_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const SHA_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

#[tokio::test]
async fn search_returns_registered_ids() {
    let catalog = MemoryCatalog::new().with_search(SHA_A, &[1, 2, 3]);
    let ids = catalog
        .search_by_sha1(&CatalogSession::anonymous(), SHA_A)
        .await
        .unwrap();

    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn search_unknown_sha1_is_empty_not_error() {
    let catalog = MemoryCatalog::new();
    let ids = catalog
        .search_by_sha1(&CatalogSession::anonymous(), SHA_B)
        .await
        .unwrap();

    assert!(ids.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive() {
    let catalog = MemoryCatalog::new().with_search(SHA_A, &[5]);
    let ids = catalog
        .search_by_sha1(&CatalogSession::anonymous(), &SHA_A.to_ascii_uppercase())
        .await
        .unwrap();

    assert_eq!(ids, vec![5]);
}

#[tokio::test]
async fn search_rejects_malformed_sha1() {
    let catalog = MemoryCatalog::new();
    let err = catalog
        .search_by_sha1(&CatalogSession::anonymous(), "1234")
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidFingerprint(_)));
    assert!(catalog.calls().is_empty());
}

#[tokio::test]
async fn authenticate_checks_credentials() {
    let catalog = MemoryCatalog::new().with_credentials("dumper", "hunter2");

    let session = catalog.authenticate("dumper", "hunter2").await.unwrap();
    assert_eq!(session.username(), Some("dumper"));

    let err = catalog.authenticate("dumper", "wrong").await.unwrap_err();
    assert!(matches!(err, CatalogError::AuthenticationFailed(_)));
}

#[tokio::test]
async fn fetch_missing_record_is_not_found() {
    let catalog = MemoryCatalog::new();
    let err = catalog
        .fetch_by_id(&CatalogSession::anonymous(), 77)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(77)));
}

#[tokio::test]
async fn fetch_returns_record_and_logs_calls() {
    let mut record = CatalogRecord::new(9);
    record.title = Some("Panzer Dragoon".to_string());
    let catalog = MemoryCatalog::new().with_record(record.clone());
    let session = CatalogSession::anonymous();

    let fetched = catalog.fetch_by_id(&session, 9).await.unwrap();
    assert_eq!(fetched, record);
    assert_eq!(catalog.calls(), vec![CatalogCall::Fetch(9)]);
}

#[tokio::test]
async fn failing_searches_surface_http_error() {
    let catalog = MemoryCatalog::new().failing_searches();
    let err = catalog
        .search_by_sha1(&CatalogSession::anonymous(), SHA_A)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Http(_)));
    assert_eq!(catalog.searched(), vec![SHA_A.to_string()]);
}

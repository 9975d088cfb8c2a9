//! Tenant-level flows against the stored config and a mock identity provider

mod common;

use common::{APP_ID, DIRECTORY_ID, MockGraph, create_token_error};
use m365_admin::api::{
    CleanupOutcome, ErrorCategory, GraphError, SpoStatus, TenantManager, UnsavedSecret,
};
use m365_admin::config::{Config, TenantRecord};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn manager_with_tenant(graph: &MockGraph) -> TenantManager {
    let mut config = graph.config();
    config
        .add_tenant(
            "contoso".into(),
            TenantRecord::new(DIRECTORY_ID.into(), APP_ID.into(), "old-secret".into()),
        )
        .unwrap();
    TenantManager::new(config)
}

fn graph_error(err: &anyhow::Error) -> &GraphError {
    err.chain()
        .find_map(|e| e.downcast_ref::<GraphError>())
        .expect("error chain should contain a GraphError")
}

#[tokio::test]
async fn test_validate_tenant_posts_client_credentials() {
    let graph = MockGraph::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", DIRECTORY_ID)))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_secret=old-secret"))
        .and(body_string_contains("%2F.default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::create_token_response("tok")))
        .expect(1)
        .mount(&graph.server)
        .await;

    let manager = manager_with_tenant(&graph);
    assert_eq!(manager.validate_tenant(None).await.unwrap(), "contoso");
}

#[tokio::test]
async fn test_invalid_secret_is_classified() {
    let graph = MockGraph::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{}/oauth2/v2.0/token", DIRECTORY_ID)))
        .respond_with(ResponseTemplate::new(401).set_body_json(create_token_error(
            7000215,
            "AADSTS7000215: Invalid client secret provided.",
        )))
        .mount(&graph.server)
        .await;

    let manager = manager_with_tenant(&graph);
    let err = manager.validate_tenant(Some("contoso")).await.unwrap_err();

    let category = graph_error(&err).category();
    assert_eq!(category, ErrorCategory::InvalidSecret);
    assert_eq!(category.http_status(), 401);
}

#[tokio::test]
async fn test_unknown_tenant_name_is_rejected() {
    let graph = MockGraph::start().await;
    let manager = manager_with_tenant(&graph);

    let err = manager.validate_tenant(Some("fabrikam")).await.unwrap_err();
    assert!(err.to_string().contains("fabrikam"));
}

#[tokio::test]
async fn test_sharepoint_status_is_persisted() {
    let graph = MockGraph::start().await;
    graph.mount_token_endpoint(DIRECTORY_ID, "tok").await;
    Mock::given(method("GET"))
        .and(path("/sites/root/drive/root/permissions"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&graph.server)
        .await;

    let mut manager = manager_with_tenant(&graph);
    let (_, probe) = manager.check_sharepoint(None).await.unwrap();
    assert_eq!(probe.status, SpoStatus::Unavailable);

    let stored = manager.config().get_tenant("contoso").unwrap();
    assert_eq!(stored.spo_status, Some(SpoStatus::Unavailable));
    assert_eq!(stored.spo_checked_at, Some(probe.checked_at));
}

#[tokio::test]
async fn test_rotated_secret_is_saved_to_record() {
    let graph = MockGraph::start().await;
    graph.mount_token_endpoint(DIRECTORY_ID, "tok").await;
    graph.mount_application(APP_ID, &["old-key"]).await;
    graph.mount_add_password("new-key", "n3w-s3cret").await;
    Mock::given(method("POST"))
        .and(path(format!("/applications/{}/removePassword", common::APP_OBJECT_ID)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&graph.server)
        .await;

    let mut manager = manager_with_tenant(&graph);
    let (name, rotation) = manager.rotate_secret(None, true).await.unwrap();

    assert_eq!(name, "contoso");
    assert!(matches!(rotation.cleanup, CleanupOutcome::Deleted { .. }));

    let config_path = manager.config().path().unwrap();
    let reloaded = Config::load_from(config_path).unwrap();
    let stored = reloaded.get_tenant("contoso").unwrap();
    assert_eq!(stored.application_secret, "n3w-s3cret");
    assert_eq!(
        stored.secret_expires_at.map(|d| d.to_rfc3339()),
        Some("2099-12-31T23:59:59+00:00".to_string())
    );
}

#[tokio::test]
async fn test_unsaved_secret_is_returned_with_error() {
    let graph = MockGraph::start().await;
    graph.mount_token_endpoint(DIRECTORY_ID, "tok").await;
    graph.mount_application(APP_ID, &["old-key"]).await;
    graph.mount_add_password("new-key", "n3w-s3cret").await;
    Mock::given(method("POST"))
        .and(path(format!("/applications/{}/removePassword", common::APP_OBJECT_ID)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&graph.server)
        .await;

    let mut manager = manager_with_tenant(&graph);
    let config_dir = manager.config().path().unwrap().parent().unwrap().to_path_buf();
    std::fs::remove_dir_all(&config_dir).unwrap();

    let err = manager.rotate_secret(None, true).await.unwrap_err();

    let unsaved = err
        .downcast_ref::<UnsavedSecret>()
        .expect("error should carry the issued secret");
    assert_eq!(unsaved.tenant, "contoso");
    assert_eq!(unsaved.rotation.secret_text, "n3w-s3cret");
    assert_eq!(unsaved.rotation.key_id, "new-key");
    assert!(matches!(unsaved.rotation.cleanup, CleanupOutcome::Deleted { .. }));
    assert!(!err.to_string().contains("n3w-s3cret"));
}

#[tokio::test]
async fn test_failed_rotation_leaves_record_untouched() {
    let graph = MockGraph::start().await;
    graph.mount_token_endpoint(DIRECTORY_ID, "tok").await;
    graph.mount_application(APP_ID, &["old-key"]).await;
    Mock::given(method("POST"))
        .and(path(format!("/applications/{}/addPassword", common::APP_OBJECT_ID)))
        .respond_with(ResponseTemplate::new(403).set_body_json(common::create_odata_error(
            "Authorization_RequestDenied",
            "Insufficient privileges to complete the operation.",
        )))
        .mount(&graph.server)
        .await;

    let mut manager = manager_with_tenant(&graph);
    let err = manager.rotate_secret(None, false).await.unwrap_err();

    assert_eq!(graph_error(&err).category(), ErrorCategory::InsufficientPrivileges);
    assert_eq!(
        manager.config().get_tenant("contoso").unwrap().application_secret,
        "old-secret"
    );
}

#[tokio::test]
async fn test_configure_permissions_returns_consent_url() {
    let graph = MockGraph::start().await;
    graph.mount_token_endpoint(DIRECTORY_ID, "tok").await;
    graph.mount_application(APP_ID, &[]).await;
    Mock::given(method("PATCH"))
        .and(path(format!("/applications/{}", common::APP_OBJECT_ID)))
        .respond_with(ResponseTemplate::new(204))
        .mount(&graph.server)
        .await;

    let manager = manager_with_tenant(&graph);
    let (_, setup) = manager.configure_permissions(None).await.unwrap();

    assert_eq!(
        setup.admin_consent_url,
        format!("{}/{}/adminconsent?client_id={}", graph.uri(), DIRECTORY_ID, APP_ID)
    );
    assert_eq!(setup.configuration.permissions_configured.len(), 8);
}

//! Shared fixtures for the Graph integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use m365_admin::api::{GraphClient, GraphResult, ResilienceConfig, TokenProvider};
use m365_admin::config::{Config, Settings};

pub const DIRECTORY_ID: &str = "dir-contoso";
pub const APP_ID: &str = "app-123";
pub const APP_OBJECT_ID: &str = "obj-1";

/// Issues `token-1`, `token-2`, ... and counts how many were requested
#[derive(Default)]
pub struct CountingTokenProvider {
    issued: AtomicUsize,
}

impl CountingTokenProvider {
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for CountingTokenProvider {
    async fn access_token(&self) -> GraphResult<String> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("token-{}", n))
    }
}

/// A wiremock server standing in for both Graph and the identity provider
pub struct MockGraph {
    pub server: MockServer,
    pub tokens: Arc<CountingTokenProvider>,
}

impl MockGraph {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            tokens: Arc::new(CountingTokenProvider::default()),
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Client with millisecond cleanup delays and the counting token provider
    pub fn client(&self) -> GraphClient {
        GraphClient::with_config(self.uri(), self.tokens.clone(), ResilienceConfig::immediate())
            .unwrap()
    }

    /// Settings that send both Graph and token traffic to this server
    pub fn settings(&self) -> Settings {
        Settings {
            graph_endpoint: self.uri(),
            login_endpoint: self.uri(),
            secret_propagation_delay_ms: 0,
            secret_cleanup_base_delay_ms: 1,
            ..Settings::default()
        }
    }

    /// Empty config in a fresh temporary directory, pointed at this server
    pub fn config(&self) -> Config {
        let dir = std::env::temp_dir().join(format!("m365-admin-it-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut config = Config::load_from(&dir.join("config.toml")).unwrap();
        config.settings = self.settings();
        config
    }

    pub async fn mount_token_endpoint(&self, directory_id: &str, access_token: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", directory_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_token_response(access_token)))
            .mount(&self.server)
            .await;
    }

    /// `GET /applications?$filter=appId eq '<app_id>'` returning one application
    pub async fn mount_application(&self, app_id: &str, key_ids: &[&str]) {
        Mock::given(method("GET"))
            .and(path("/applications"))
            .and(query_param("$filter", format!("appId eq '{}'", app_id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(create_odata_response(vec![
                create_application(APP_OBJECT_ID, app_id, key_ids),
            ])))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_add_password(&self, key_id: &str, secret_text: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/applications/{}/addPassword", APP_OBJECT_ID)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_password_credential(key_id, secret_text)),
            )
            .expect(1)
            .mount(&self.server)
            .await;
    }

    pub async fn requests_to(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

pub fn create_token_response(access_token: &str) -> Value {
    json!({
        "token_type": "Bearer",
        "expires_in": 3599,
        "access_token": access_token
    })
}

pub fn create_token_error(code: u64, description: &str) -> Value {
    json!({
        "error": "invalid_client",
        "error_description": description,
        "error_codes": [code]
    })
}

pub fn create_odata_error(code: &str, message: &str) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message
        }
    })
}

pub fn create_odata_response(items: Vec<Value>) -> Value {
    json!({ "value": items })
}

pub fn create_test_user(id: &str, upn: &str) -> Value {
    json!({
        "id": id,
        "displayName": format!("Test User {}", id),
        "userPrincipalName": upn,
        "mail": upn,
        "accountEnabled": true,
        "usageLocation": "US"
    })
}

pub fn create_application(object_id: &str, app_id: &str, key_ids: &[&str]) -> Value {
    let credentials: Vec<Value> = key_ids
        .iter()
        .map(|key_id| {
            json!({
                "keyId": key_id,
                "displayName": "existing",
                "endDateTime": "2026-01-01T00:00:00Z"
            })
        })
        .collect();

    json!({
        "id": object_id,
        "appId": app_id,
        "displayName": "M365 Admin",
        "passwordCredentials": credentials
    })
}

pub fn create_password_credential(key_id: &str, secret_text: &str) -> Value {
    json!({
        "keyId": key_id,
        "displayName": "M365 Admin Auto-Generated Secret",
        "secretText": secret_text,
        "endDateTime": "2099-12-31T23:59:59Z"
    })
}

pub fn temp_file(name: &str, content: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("m365-admin-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join(name);
    std::fs::write(&file, content).unwrap();
    file
}

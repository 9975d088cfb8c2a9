use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::constants;
use super::error::{AuthFailureKind, GraphError, GraphResult};
use super::models::TenantCredential;

/// Source of bearer tokens for Graph requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Acquire a fresh access token. Implementations do not retry.
    async fn access_token(&self) -> GraphResult<String>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[allow(dead_code)]
    expires_in: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
    #[serde(default)]
    error_codes: Vec<u64>,
}

/// Exchanges a tenant's application credentials for a Graph token using the
/// OAuth2 client-credentials grant.
pub struct ClientCredentialsProvider {
    credential: TenantCredential,
    token_url: String,
    scope: String,
    http_client: reqwest::Client,
}

impl ClientCredentialsProvider {
    pub fn new(credential: TenantCredential, login_endpoint: &str, graph_endpoint: &str) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("m365-admin/1.0")
            .build()?;

        Self::with_custom_client(credential, login_endpoint, graph_endpoint, http_client)
    }

    pub fn with_custom_client(
        credential: TenantCredential,
        login_endpoint: &str,
        graph_endpoint: &str,
        http_client: reqwest::Client,
    ) -> GraphResult<Self> {
        let token_url = constants::token_endpoint(login_endpoint, &credential.directory_id);
        Ok(Self {
            credential,
            token_url,
            scope: constants::graph_scope(graph_endpoint)?,
            http_client,
        })
    }

    pub fn credential(&self) -> &TenantCredential {
        &self.credential
    }

    /// Check that the identity provider accepts the credentials
    pub async fn validate(&self) -> GraphResult<()> {
        self.access_token().await.map(|_| ())
    }

    fn classify_failure(status: u16, body: &str) -> GraphError {
        let parsed: TokenErrorResponse = serde_json::from_str(body).unwrap_or_default();

        let kind = parsed
            .error_codes
            .iter()
            .map(|code| AuthFailureKind::from_aadsts_code(*code))
            .find(|kind| *kind != AuthFailureKind::Rejected)
            .unwrap_or(AuthFailureKind::Rejected);

        let description = parsed
            .error_description
            .or(parsed.error)
            .unwrap_or_else(|| format!("token endpoint returned {}: {}", status, body));

        GraphError::Authentication { kind, description }
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsProvider {
    async fn access_token(&self) -> GraphResult<String> {
        log::info!(
            "Requesting Graph token for application {} in directory {}",
            self.credential.application_id,
            self.credential.directory_id
        );

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credential.application_id.as_str()),
                ("client_secret", self.credential.application_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        log::debug!("Token request status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            let error = Self::classify_failure(status.as_u16(), &body);
            log::warn!("Token request rejected: {}", error);
            return Err(error);
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        match token.access_token {
            Some(access_token) if !access_token.is_empty() => {
                log::info!(
                    "Acquired Graph token for directory {}",
                    self.credential.directory_id
                );
                Ok(access_token)
            }
            _ => Err(GraphError::Authentication {
                kind: AuthFailureKind::Rejected,
                description: "No access token in response".to_string(),
            }),
        }
    }
}

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::auth::{ClientCredentialsProvider, TokenProvider};
use super::constants::{self, headers};
use super::error::{GraphError, GraphResult};
use super::models::{ODataList, TenantCredential};
use super::resilience::{ApiLogger, OperationContext, ResilienceConfig};
use crate::config::Settings;

/// Successful outcome of a dispatched Graph call
#[derive(Debug, Clone, PartialEq)]
pub enum GraphResponse {
    Json(Value),
    /// 204, or a 2xx whose body is not JSON
    NoContent,
}

impl GraphResponse {
    pub fn into_json(self) -> Value {
        match self {
            GraphResponse::Json(value) => value,
            GraphResponse::NoContent => Value::Null,
        }
    }

    pub fn into_value<T: DeserializeOwned>(self) -> GraphResult<T> {
        Ok(serde_json::from_value(self.into_json())?)
    }

    /// Items of an OData collection; empty when Graph sent no body
    pub fn into_list<T: DeserializeOwned>(self) -> GraphResult<Vec<T>> {
        match self {
            GraphResponse::Json(value) => {
                let list: ODataList<T> = serde_json::from_value(value)?;
                Ok(list.value)
            }
            GraphResponse::NoContent => Ok(Vec::new()),
        }
    }
}

/// Microsoft Graph client bound to one tenant's credentials.
///
/// The access token is acquired lazily and cached on the instance. A 401 drops
/// the cached token and the request is repeated once with a fresh one; a
/// second 401 is returned to the caller.
pub struct GraphClient {
    base_url: String,
    http_client: reqwest::Client,
    provider: Arc<dyn TokenProvider>,
    token: RwLock<Option<String>>,
    api_logger: ApiLogger,
    resilience: ResilienceConfig,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, provider: Arc<dyn TokenProvider>) -> GraphResult<Self> {
        Self::with_config(base_url, provider, ResilienceConfig::default())
    }

    pub fn with_config(
        base_url: impl Into<String>,
        provider: Arc<dyn TokenProvider>,
        resilience: ResilienceConfig,
    ) -> GraphResult<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .timeout(resilience.request_timeout)
            .connect_timeout(resilience.connect_timeout)
            .user_agent("m365-admin/1.0")
            .build()?;

        Ok(Self::with_custom_client(base_url, provider, resilience, http_client))
    }

    pub fn with_custom_client(
        base_url: impl Into<String>,
        provider: Arc<dyn TokenProvider>,
        resilience: ResilienceConfig,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
            provider,
            token: RwLock::new(None),
            api_logger: ApiLogger::new(resilience.monitoring.clone()),
            resilience,
        }
    }

    /// Client for a stored tenant, using the configured endpoints
    pub fn for_tenant(credential: TenantCredential, settings: &Settings) -> GraphResult<Self> {
        let provider = ClientCredentialsProvider::new(
            credential,
            &settings.login_endpoint,
            &settings.graph_endpoint,
        )?;

        Self::with_config(
            settings.graph_endpoint.clone(),
            Arc::new(provider),
            settings.resilience(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resilience(&self) -> &ResilienceConfig {
        &self.resilience
    }

    /// Drop the cached token; the next request acquires a new one
    pub async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn bearer_token(&self) -> GraphResult<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let fresh = self.provider.access_token().await?;
        *self.token.write().await = Some(fresh.clone());
        Ok(fresh)
    }

    /// Dispatch a call and interpret the response
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> GraphResult<GraphResponse> {
        let context = self.api_logger.start_operation(method.as_str(), path);

        let result = match self.send(&context, method, path, body, query).await {
            Ok(response) => Self::parse_response(response).await,
            Err(e) => Err(e),
        };

        let error_message = result.as_ref().err().map(|e| e.to_string());
        self.api_logger
            .complete_operation(&context, result.is_ok(), error_message.as_deref());

        result
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> GraphResult<GraphResponse> {
        self.request(Method::GET, path, None, query).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> GraphResult<GraphResponse> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> GraphResult<GraphResponse> {
        self.request(Method::PATCH, path, Some(body), &[]).await
    }

    pub async fn delete(&self, path: &str) -> GraphResult<GraphResponse> {
        self.request(Method::DELETE, path, None, &[]).await
    }

    /// GET returning the raw body, for CSV reports
    pub async fn get_bytes(&self, path: &str) -> GraphResult<Vec<u8>> {
        let context = self.api_logger.start_operation("GET", path);

        let result: GraphResult<Vec<u8>> = async {
            let response = self.send(&context, Method::GET, path, None, &[]).await?;
            let status = response.status();
            if status.is_success() {
                Ok(response.bytes().await?.to_vec())
            } else {
                let text = response.text().await?;
                Err(Self::error_from_text(status.as_u16(), text))
            }
        }
        .await;

        let error_message = result.as_ref().err().map(|e| e.to_string());
        self.api_logger
            .complete_operation(&context, result.is_ok(), error_message.as_deref());

        result
    }

    /// GET returning the status code and the body if it parses as JSON.
    /// Non-success statuses are not errors here; the caller classifies them.
    pub async fn probe(&self, path: &str) -> GraphResult<(u16, Option<Value>)> {
        let context = self.api_logger.start_operation("GET", path);

        let result: GraphResult<(u16, Option<Value>)> = async {
            let response = self.send(&context, Method::GET, path, None, &[]).await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            Ok((status, serde_json::from_str::<Value>(&text).ok()))
        }
        .await;

        let error_message = result.as_ref().err().map(|e| e.to_string());
        self.api_logger
            .complete_operation(&context, result.is_ok(), error_message.as_deref());

        result
    }

    /// Send with the bearer token, re-authenticating once on 401
    async fn send(
        &self,
        context: &OperationContext,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &[(&str, String)],
    ) -> GraphResult<reqwest::Response> {
        let url = constants::graph_url(&self.base_url, path);
        let mut attempt = 1;

        loop {
            let token = self.bearer_token().await?;

            let mut request = self
                .http_client
                .request(method.clone(), &url)
                .bearer_auth(&token)
                .header("Accept", headers::CONTENT_TYPE_JSON);

            if self.api_logger.correlation_ids_enabled() {
                request = request.header(headers::CLIENT_REQUEST_ID, &context.correlation_id);
            }
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status().as_u16();
            self.api_logger.log_response(context, status, attempt);

            if status == 401 && attempt == 1 {
                self.api_logger.log_reauthentication(context);
                self.invalidate_token().await;
                attempt += 1;
                continue;
            }

            return Ok(response);
        }
    }

    async fn parse_response(response: reqwest::Response) -> GraphResult<GraphResponse> {
        let status = response.status();
        if status.as_u16() == 204 {
            return Ok(GraphResponse::NoContent);
        }

        let text = response.text().await?;
        match serde_json::from_str::<Value>(&text) {
            Ok(json) if status.as_u16() >= 400 => Err(GraphError::from_response(status.as_u16(), json)),
            Ok(json) => Ok(GraphResponse::Json(json)),
            Err(_) if status.is_success() => Ok(GraphResponse::NoContent),
            Err(_) => Err(GraphError::from_response(status.as_u16(), Value::String(text))),
        }
    }

    fn error_from_text(status: u16, text: String) -> GraphError {
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => GraphError::from_response(status, json),
            Err(_) => GraphError::from_response(status, Value::String(text)),
        }
    }
}

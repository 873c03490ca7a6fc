//! HTTP client for the platform's services.
//!
//! Requests are addressed by logical [`ServiceName`] and a path relative to
//! that service. The client resolves the URL through the configured
//! [`ServiceRegistry`](crate::config::ServiceRegistry), attaches JSON headers
//! and, for services that require it, a bearer token.
//!
//! # Authentication
//!
//! The token is fetched on first use and cached for the lifetime of the
//! client (and its clones) until [`ApiClient::reset_token`] is called.
//!
//! # Retries
//!
//! Transport failures (connection refused, timeouts, broken bodies) are
//! retried by the configured [`RetryPolicy`]. HTTP error statuses are not
//! retried; they come back as ordinary [`ApiResponse`] values.

pub mod auth;
pub mod request;
pub mod retry;

use std::sync::Arc;

use ecommerce_harness_core::{ResourceKey, ResourceKind, ServiceName};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

pub use auth::AuthToken;
pub use request::{ApiRequest, ApiResponse, RequestBody};
pub use retry::RetryPolicy;

use crate::config::{HarnessConfig, ServiceEntry};

/// Errors that can occur when talking to the platform.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request failed at the transport level on every attempt.
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service is not in the registry.
    #[error("Unknown service '{service}', available: {}", format_services(.available))]
    UnknownService {
        service: ServiceName,
        available: Vec<ServiceName>,
    },

    /// The authentication endpoint rejected the credentials.
    #[error("Authentication failed with HTTP {status}: {body}")]
    AuthenticationFailed { status: StatusCode, body: String },

    /// The authentication response carried no token.
    #[error("Authentication response did not contain a token")]
    MissingToken,

    /// A response had a non-2xx status where success was required.
    #[error("Unexpected HTTP {status} from {url}: {body}")]
    UnexpectedStatus {
        status: StatusCode,
        url: String,
        body: String,
    },

    /// A body could not be encoded or decoded as JSON.
    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A caller-supplied header name or value is not valid.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

fn format_services(services: &[ServiceName]) -> String {
    services
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Session-scoped client for the platform.
///
/// Cloning is cheap; clones share the HTTP connection pool and token cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    config: HarnessConfig,
    /// In-memory token cache
    token: RwLock<Option<AuthToken>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("gateway_url", &self.inner.config.gateway_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Build` if the HTTP client cannot be created.
    pub fn new(config: HarnessConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                config,
                token: RwLock::new(None),
            }),
        })
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.inner.config
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Return the cached token, authenticating first if none is cached.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    #[instrument(skip(self))]
    pub async fn token(&self) -> Result<AuthToken, ClientError> {
        if let Some(token) = self.inner.token.read().await.as_ref() {
            return Ok(token.clone());
        }

        let mut cached = self.inner.token.write().await;
        // Another task may have authenticated while we waited for the lock.
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let config = &self.inner.config;
        let token = auth::authenticate(
            &self.inner.http,
            &config.auth_url,
            &config.credentials,
            &config.retry,
        )
        .await?;
        *cached = Some(token.clone());
        drop(cached);
        Ok(token)
    }

    /// Clear the cached token. The next authenticated request fetches a new one.
    pub async fn reset_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Replace the cached token.
    pub async fn set_token(&self, token: AuthToken) {
        *self.inner.token.write().await = Some(token);
    }

    /// The cached token, without authenticating.
    pub async fn cached_token(&self) -> Option<AuthToken> {
        self.inner.token.read().await.clone()
    }

    // =========================================================================
    // Requests
    // =========================================================================

    fn entry(&self, service: ServiceName) -> Result<&ServiceEntry, ClientError> {
        let services = &self.inner.config.services;
        services
            .get(service)
            .ok_or_else(|| ClientError::UnknownService {
                service,
                available: services.names(),
            })
    }

    /// Full URL of `path` on `service`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnknownService` if the service is not configured.
    pub fn url_for(&self, service: ServiceName, path: &str) -> Result<String, ClientError> {
        Ok(self.entry(service)?.url_for(path))
    }

    async fn headers_for(
        &self,
        entry: &ServiceEntry,
        request: &ApiRequest,
    ) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        let content_type = match request.body {
            Some(RequestBody::Text(_)) => "text/plain",
            _ => "application/json",
        };
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if entry.requires_auth && !request.anonymous {
            let token = self.token().await?;
            let value = HeaderValue::from_str(&format!("Bearer {}", token.secret()))
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Send a request.
    ///
    /// Non-2xx responses are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unknown, authentication fails or
    /// every attempt fails at the transport level.
    #[instrument(skip(self, request), fields(service = %request.service, method = %request.method, path = %request.path))]
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let entry = self.entry(request.service)?;
        let url = entry.url_for(&request.path);
        let headers = self.headers_for(entry, &request).await?;

        let response = self
            .inner
            .config
            .retry
            .run(|attempt| {
                let mut builder = self
                    .inner
                    .http
                    .request(request.method.clone(), &url)
                    .headers(headers.clone());
                if !request.params.is_empty() {
                    builder = builder.query(&request.params);
                }
                builder = match &request.body {
                    Some(RequestBody::Json(value)) => builder.json(value),
                    Some(RequestBody::Text(text)) => builder.body(text.clone()),
                    None => builder,
                };
                debug!(attempt, url = %url, "Sending request");

                async move {
                    let response = builder.send().await.map_err(ClientError::Transport)?;
                    let status = response.status();
                    let url = response.url().to_string();
                    let headers = response.headers().clone();
                    let body = response.text().await.map_err(ClientError::Transport)?;
                    Ok::<_, ClientError>(ApiResponse::new(status, url, body).with_headers(headers))
                }
            })
            .await?;

        if response.is_success() {
            debug!(
                status = %response.status(),
                body = %response.body_preview(),
                "Request succeeded"
            );
        } else {
            warn!(
                status = %response.status(),
                url = %response.url(),
                body = %response.body_preview(),
                "Request returned error status"
            );
        }

        Ok(response)
    }

    /// `GET` a path.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, service: ServiceName, path: &str) -> Result<ApiResponse, ClientError> {
        self.request(ApiRequest::new(Method::GET, service, path))
            .await
    }

    /// `GET` a path with query parameters.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get_with_params(
        &self,
        service: ServiceName,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse, ClientError> {
        let request = params
            .iter()
            .fold(ApiRequest::new(Method::GET, service, path), |req, (k, v)| {
                req.param(*k, v)
            });
        self.request(request).await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if `body` cannot be serialized, otherwise
    /// see [`ApiClient::request`].
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        service: ServiceName,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let body = serde_json::to_value(body)?;
        self.request(ApiRequest::new(Method::POST, service, path).json(body))
            .await
    }

    /// `POST` a plain-text body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post_text(
        &self,
        service: ServiceName,
        path: &str,
        body: &str,
    ) -> Result<ApiResponse, ClientError> {
        self.request(ApiRequest::new(Method::POST, service, path).text(body))
            .await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if `body` cannot be serialized, otherwise
    /// see [`ApiClient::request`].
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        service: ServiceName,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let body = serde_json::to_value(body)?;
        self.request(ApiRequest::new(Method::PUT, service, path).json(body))
            .await
    }

    /// `DELETE` a path.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(
        &self,
        service: ServiceName,
        path: &str,
    ) -> Result<ApiResponse, ClientError> {
        self.request(ApiRequest::new(Method::DELETE, service, path))
            .await
    }

    // =========================================================================
    // Resource helpers
    // =========================================================================

    /// Fetch one resource. Any non-2xx status yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport or decode failure.
    pub async fn find(
        &self,
        kind: ResourceKind,
        key: &ResourceKey,
    ) -> Result<Option<Value>, ClientError> {
        let response = self.get(kind.service(), &kind.item_path(key)).await?;
        if response.is_success() {
            Ok(Some(response.record()?))
        } else {
            Ok(None)
        }
    }

    /// Fetch the whole collection of a kind.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnexpectedStatus` on a non-2xx status, or an
    /// error on transport or decode failure.
    pub async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, ClientError> {
        let record = self
            .get(kind.service(), kind.endpoint())
            .await?
            .error_for_status()?
            .record()?;
        Ok(collection_items(record))
    }

    /// Delete one resource, returning the raw response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete_resource(
        &self,
        kind: ResourceKind,
        key: &ResourceKey,
    ) -> Result<ApiResponse, ClientError> {
        self.delete(kind.service(), &kind.item_path(key)).await
    }
}

/// Items of a `{"collection": [...]}` envelope or a bare list.
///
/// Anything else yields an empty list.
#[must_use]
pub fn collection_items(record: Value) -> Vec<Value> {
    match record {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("collection") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

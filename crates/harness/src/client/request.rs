//! Request description and buffered response.

use ecommerce_harness_core::ServiceName;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ClientError;

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`.
    Json(Value),
    /// Sent as `text/plain` (cloud-config `/encrypt`, `/decrypt`).
    Text(String),
}

/// A request against a logical service.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) service: ServiceName,
    pub(crate) path: String,
    pub(crate) body: Option<RequestBody>,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) anonymous: bool,
}

impl ApiRequest {
    /// Create a request for `path` on `service`.
    #[must_use]
    pub fn new(method: Method, service: ServiceName, path: impl Into<String>) -> Self {
        Self {
            method,
            service,
            path: path.into(),
            body: None,
            params: Vec::new(),
            headers: Vec::new(),
            anonymous: false,
        }
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a plain-text body.
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Add a header. Extra headers override the defaults.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send without a bearer token even if the service requires one.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub const fn service(&self) -> ServiceName {
        self.service
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A fully buffered HTTP response.
///
/// Non-2xx responses are ordinary values; call [`ApiResponse::error_for_status`]
/// to turn them into errors.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: String,
    body: String,
}

impl ApiResponse {
    /// Build a response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            url: url.into(),
            body: body.into(),
        }
    }

    #[must_use]
    pub(crate) fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// First 100 characters of the body, for log lines.
    #[must_use]
    pub fn body_preview(&self) -> String {
        const PREVIEW_CHARS: usize = 100;
        if self.body.chars().count() > PREVIEW_CHARS {
            let head: String = self.body.chars().take(PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            self.body.clone()
        }
    }

    /// Deserialize the body.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// The body as an untyped JSON record. An empty body is `null`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if the body is not valid JSON.
    pub fn record(&self) -> Result<Value, ClientError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        self.json()
    }

    /// Convert a non-2xx response into an error.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::UnexpectedStatus` if the status is not 2xx.
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::UnexpectedStatus {
                status: self.status,
                url: self.url,
                body: self.body,
            })
        }
    }
}

//! Bearer token acquisition.
//!
//! The platform exchanges a username/password pair for a JWT at the
//! authentication endpoint: `POST {username, password}` → `{"jwtToken": ...}`.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{ClientError, RetryPolicy};
use crate::config::TestCredentials;

/// JWT obtained from the authentication endpoint.
#[derive(Debug, Clone)]
pub struct AuthToken {
    /// Bearer token sent on authenticated requests.
    pub access_token: SecretString,
    /// When the token was obtained.
    pub obtained_at: DateTime<Utc>,
}

impl AuthToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            obtained_at: Utc::now(),
        }
    }

    /// The raw token value.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.access_token.expose_secret()
    }
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(rename = "jwtToken", alias = "token")]
    jwt_token: Option<String>,
}

/// Exchange `credentials` for a bearer token.
///
/// Transport failures are retried according to `retry`.
///
/// # Errors
///
/// Returns `ClientError::AuthenticationFailed` if the endpoint does not answer
/// 200, `ClientError::MissingToken` if the response carries no token, and
/// `ClientError::Transport` once the retry budget is spent.
#[instrument(skip(http, credentials, retry), fields(username = %credentials.username))]
pub async fn authenticate(
    http: &reqwest::Client,
    auth_url: &str,
    credentials: &TestCredentials,
    retry: &RetryPolicy,
) -> Result<AuthToken, ClientError> {
    let payload = AuthRequest {
        username: &credentials.username,
        password: credentials.password.expose_secret(),
    };

    let (status, body) = retry
        .run(|_| {
            let request = http.post(auth_url).json(&payload);
            async move {
                let response = request.send().await.map_err(ClientError::Transport)?;
                let status = response.status();
                let body = response.text().await.map_err(ClientError::Transport)?;
                Ok::<_, ClientError>((status, body))
            }
        })
        .await?;

    if status != reqwest::StatusCode::OK {
        warn!(%status, "Authentication rejected");
        return Err(ClientError::AuthenticationFailed { status, body });
    }

    let parsed: AuthResponse = serde_json::from_str(&body)?;
    let token = parsed
        .jwt_token
        .filter(|t| !t.is_empty())
        .ok_or(ClientError::MissingToken)?;

    info!("Obtained bearer token");
    Ok(AuthToken::new(token))
}

//! Harness configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional (all have defaults)
//! - `API_GATEWAY_URL` - Base URL shared by every service (default: `http://localhost:8080`)
//! - `<SERVICE>_URL` - Per-service base URL override (e.g. `USER_SERVICE_URL`)
//! - `<SERVICE>_REQUIRES_AUTH` - Per-service bearer-token override (`true`/`false`)
//! - `SERVICE_DISCOVERY_URL` - Eureka base URL (default: `http://localhost:8761`)
//! - `CLOUD_CONFIG_URL` - Config server base URL (default: `http://localhost:9296`)
//! - `AUTH_URL` - Authentication endpoint (default: `{API_GATEWAY_URL}/api/authenticate`)
//! - `TEST_USERNAME` / `TEST_PASSWORD` - Credentials exchanged for a bearer token
//! - `REQUEST_TIMEOUT` - Per-request timeout in seconds (default: 10)
//! - `MAX_RETRIES` - Attempts per request on transport errors (default: 3)
//! - `RETRY_DELAY` - Seconds between attempts (default: 2)
//! - `WAIT_TIMEOUT` - Polling timeout for eventual assertions in seconds (default: 30)
//! - `CLEANUP_AFTER_TEST` - Delete tracked resources after each test (default: true)
//! - `TEST_DATA_PREFIX` - Prefix for generated unique identifiers (default: `e2e_`)

use std::collections::BTreeMap;
use std::time::Duration;

use ecommerce_harness_core::ServiceName;
use secrecy::SecretString;
use thiserror::Error;

use crate::client::RetryPolicy;

const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";
const DEFAULT_DISCOVERY_URL: &str = "http://localhost:8761";
const DEFAULT_CLOUD_CONFIG_URL: &str = "http://localhost:9296";
const DEFAULT_USERNAME: &str = "test_user";
const DEFAULT_PASSWORD: &str = "test_password";
const DEFAULT_TEST_DATA_PREFIX: &str = "e2e_";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Harness configuration.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Base URL of the API gateway
    pub gateway_url: String,
    /// Endpoint that exchanges credentials for a bearer token
    pub auth_url: String,
    /// Credentials used to obtain the bearer token
    pub credentials: TestCredentials,
    /// Logical service name to base URL mapping
    pub services: ServiceRegistry,
    /// Per-request socket timeout
    pub request_timeout: Duration,
    /// Retry policy for transport failures
    pub retry: RetryPolicy,
    /// Default timeout for polling assertions
    pub wait_timeout: Duration,
    /// Whether tracked resources are deleted at the end of a test
    pub cleanup_after_test: bool,
    /// Prefix for generated unique identifiers
    pub test_data_prefix: String,
}

/// Credentials for the authentication endpoint.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct TestCredentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for TestCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// How one service is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Optional path segment inserted between base URL and endpoint
    pub path_prefix: Option<String>,
    /// Whether requests carry the cached bearer token
    pub requires_auth: bool,
}

impl ServiceEntry {
    /// Create an entry, normalizing slashes on the base URL and prefix.
    #[must_use]
    pub fn new(base_url: &str, path_prefix: Option<&str>, requires_auth: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path_prefix: path_prefix
                .map(|p| p.trim_matches('/'))
                .filter(|p| !p.is_empty())
                .map(String::from),
            requires_auth,
        }
    }

    /// Full URL of `endpoint` on this service.
    ///
    /// A single leading `/` on the endpoint is ignored.
    #[must_use]
    pub fn url_for(&self, endpoint: &str) -> String {
        let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
        match &self.path_prefix {
            Some(prefix) => format!("{}/{prefix}/{endpoint}", self.base_url),
            None => format!("{}/{endpoint}", self.base_url),
        }
    }
}

/// Static mapping from logical service name to [`ServiceEntry`].
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    entries: BTreeMap<ServiceName, ServiceEntry>,
}

impl ServiceRegistry {
    /// Default registry routing every service through one gateway.
    ///
    /// Business services are reached under their own name as path prefix
    /// and require authentication; the gateway itself does not.
    #[must_use]
    pub fn through_gateway(gateway_url: &str) -> Self {
        let mut registry = Self::default();
        for service in ServiceName::ALL {
            let entry = match service {
                ServiceName::ApiGateway
                | ServiceName::ServiceDiscovery
                | ServiceName::CloudConfig => ServiceEntry::new(gateway_url, None, false),
                ServiceName::ProxyClient => ServiceEntry::new(gateway_url, Some("app"), true),
                _ => ServiceEntry::new(gateway_url, Some(service.as_str()), true),
            };
            registry.insert(service, entry);
        }
        registry
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, service: ServiceName, entry: ServiceEntry) {
        self.entries.insert(service, entry);
    }

    /// Look up the entry of a service.
    #[must_use]
    pub fn get(&self, service: ServiceName) -> Option<&ServiceEntry> {
        self.entries.get(&service)
    }

    /// Names of all configured services.
    #[must_use]
    pub fn names(&self) -> Vec<ServiceName> {
        self.entries.keys().copied().collect()
    }

    fn from_env(gateway_url: &str) -> Result<Self, ConfigError> {
        let mut registry = Self::through_gateway(gateway_url);
        for service in ServiceName::ALL {
            let Some(mut entry) = registry.get(service).cloned() else {
                continue;
            };
            let prefix = service.env_prefix();

            let default_base = match service {
                ServiceName::ServiceDiscovery => Some(DEFAULT_DISCOVERY_URL),
                ServiceName::CloudConfig => Some(DEFAULT_CLOUD_CONFIG_URL),
                _ => None,
            };
            if let Some(url) = get_optional_env(&format!("{prefix}_URL"))
                .or_else(|| default_base.map(String::from))
            {
                let key = format!("{prefix}_URL");
                validate_url(&key, &url)?;
                entry.base_url = url.trim_end_matches('/').to_string();
            }

            let auth_key = format!("{prefix}_REQUIRES_AUTH");
            if let Some(raw) = get_optional_env(&auth_key) {
                entry.requires_auth = parse_bool(&auth_key, &raw)?;
            }

            registry.insert(service, entry);
        }
        Ok(registry)
    }
}

impl HarnessConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let gateway_url = get_env_or_default("API_GATEWAY_URL", DEFAULT_GATEWAY_URL)
            .trim_end_matches('/')
            .to_string();
        validate_url("API_GATEWAY_URL", &gateway_url)?;

        let auth_url = get_optional_env("AUTH_URL")
            .unwrap_or_else(|| format!("{gateway_url}/api/authenticate"));
        validate_url("AUTH_URL", &auth_url)?;

        let max_attempts: u32 = parse_env("MAX_RETRIES", 3)?;
        let retry_delay: u64 = parse_env("RETRY_DELAY", 2)?;

        Ok(Self {
            services: ServiceRegistry::from_env(&gateway_url)?,
            auth_url,
            credentials: TestCredentials {
                username: get_env_or_default("TEST_USERNAME", DEFAULT_USERNAME),
                password: SecretString::from(get_env_or_default(
                    "TEST_PASSWORD",
                    DEFAULT_PASSWORD,
                )),
            },
            request_timeout: Duration::from_secs(parse_env("REQUEST_TIMEOUT", 10)?),
            retry: RetryPolicy::new(max_attempts, Duration::from_secs(retry_delay)),
            wait_timeout: Duration::from_secs(parse_env("WAIT_TIMEOUT", 30)?),
            cleanup_after_test: match get_optional_env("CLEANUP_AFTER_TEST") {
                Some(raw) => parse_bool("CLEANUP_AFTER_TEST", &raw)?,
                None => true,
            },
            test_data_prefix: get_env_or_default("TEST_DATA_PREFIX", DEFAULT_TEST_DATA_PREFIX),
            gateway_url,
        })
    }

    /// Configuration pointing every service at `base_url`, with defaults
    /// for everything else. Used against mock servers and local stacks.
    #[must_use]
    pub fn for_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            services: ServiceRegistry::through_gateway(&base_url),
            auth_url: format!("{base_url}/api/authenticate"),
            credentials: TestCredentials {
                username: DEFAULT_USERNAME.to_string(),
                password: SecretString::from(DEFAULT_PASSWORD),
            },
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            wait_timeout: Duration::from_secs(30),
            cleanup_after_test: true,
            test_data_prefix: DEFAULT_TEST_DATA_PREFIX.to_string(),
            gateway_url: base_url,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{raw}'"),
        )),
    }
}

fn validate_url(key: &str, raw: &str) -> Result<(), ConfigError> {
    url::Url::parse(raw)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

//! Configuration types for the Cloudflare API client.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: immutable settings shared by every request of a client
//! - [`ClientConfigBuilder`]: a builder for constructing [`ClientConfig`]
//! - [`RetryPolicy`]: retry count and backoff bounds
//! - [`ApiKey`], [`ApiEmail`], [`ApiToken`], [`UserServiceKey`]: validated
//!   credential newtypes, secrets masked in debug output
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use cloudflare_api::{ApiToken, ClientConfig, RetryPolicy};
//!
//! let config = ClientConfig::builder()
//!     .api_token(ApiToken::new("my-token").unwrap())
//!     .retry_policy(RetryPolicy::new(5, Duration::from_millis(500), Duration::from_secs(10)).unwrap())
//!     .rate_limit(10.0, 5)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url(), "https://api.cloudflare.com/client/v4");
//! assert_eq!(config.retry_policy().max_retries(), 5);
//! ```

mod newtypes;
mod retry;

pub use newtypes::{ApiEmail, ApiKey, ApiToken, UserServiceKey};
pub use retry::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_MAX_RETRY_DELAY, DEFAULT_MIN_RETRY_DELAY};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::auth::{AuthMask, Credentials};
use crate::clients::rate_limit::{self, DEFAULT_BURST, DEFAULT_RATE};
use crate::clients::SDK_VERSION;
use crate::error::ConfigError;

/// The public v4 API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Immutable settings shared by every request of one client.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    user_agent: String,
    default_headers: HeaderMap,
    credentials: Credentials,
    auth_mode: AuthMask,
    retry_policy: RetryPolicy,
    rate: f64,
    burst: u32,
    debug: bool,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the API root, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the headers sent with every request, `User-Agent` included.
    #[must_use]
    pub const fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Returns the configured credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the auth mask used when a request does not pick its own.
    #[must_use]
    pub const fn auth_mode(&self) -> AuthMask {
        self.auth_mode
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Returns the sustained request rate per second.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the rate limiter's burst size.
    #[must_use]
    pub const fn burst(&self) -> u32 {
        self.burst
    }

    /// Returns `true` if request and response dumps are logged.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Returns the per-attempt transport timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) const fn http_client(&self) -> Option<&reqwest::Client> {
        self.http_client.as_ref()
    }
}

/// Builder for constructing [`ClientConfig`] instances.
///
/// At least one credential is required. Everything else has a default.
///
/// # Defaults
///
/// - `base_url`: `https://api.cloudflare.com/client/v4`
/// - `user_agent`: `cloudflare-api-rust/<version>`
/// - `auth_mode`: token, else key/email, else user service key
/// - `retry_policy`: 3 retries, 1s to 30s backoff
/// - `rate_limit`: 4 requests per second, burst of 1
/// - `debug`: `false`
/// - `timeout`: none
///
/// # Example
///
/// ```rust
/// use cloudflare_api::{ApiEmail, ApiKey, AuthMask, ClientConfig, UserServiceKey};
///
/// let config = ClientConfig::builder()
///     .api_key_email(ApiKey::new("key").unwrap(), ApiEmail::new("me@example.com").unwrap())
///     .user_service_key(UserServiceKey::new("v1.0-abc").unwrap())
///     .auth_mode(AuthMask::KEY_EMAIL | AuthMask::USER_SERVICE_KEY)
///     .header("X-Team", "edge")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.auth_mode(), AuthMask::KEY_EMAIL | AuthMask::USER_SERVICE_KEY);
/// ```
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    headers: Vec<(String, String)>,
    credentials: Credentials,
    auth_mode: Option<AuthMask>,
    retry_policy: Option<RetryPolicy>,
    rate_limit: Option<(f64, u32)>,
    debug: bool,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API root.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replaces all credentials at once.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the global API key and account email.
    #[must_use]
    pub fn api_key_email(mut self, key: ApiKey, email: ApiEmail) -> Self {
        self.credentials = self.credentials.with_key_email(key, email);
        self
    }

    /// Sets the scoped API token.
    #[must_use]
    pub fn api_token(mut self, token: ApiToken) -> Self {
        self.credentials = self.credentials.with_token(token);
        self
    }

    /// Sets the user service key.
    #[must_use]
    pub fn user_service_key(mut self, key: UserServiceKey) -> Self {
        self.credentials = self.credentials.with_user_service_key(key);
        self
    }

    /// Sets the default auth mask.
    #[must_use]
    pub const fn auth_mode(mut self, mask: AuthMask) -> Self {
        self.auth_mode = Some(mask);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets the client-side rate limit.
    ///
    /// Pass `f64::INFINITY` to disable limiting.
    #[must_use]
    pub const fn rate_limit(mut self, rate: f64, burst: u32) -> Self {
        self.rate_limit = Some((rate, burst));
        self
    }

    /// Logs redacted request and response dumps at debug level.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets a timeout for each transport attempt.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses a preconfigured `reqwest` client for transport.
    ///
    /// [`timeout`](Self::timeout) is not applied to a supplied client.
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the [`ClientConfig`], validating every setting.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingCredentials`] if no credential was set
    /// - [`ConfigError::UnsupportedAuthMode`] if the auth mask is empty or
    ///   selects a scheme with no credential
    /// - [`ConfigError::InvalidBaseUrl`] if the base URL does not parse
    /// - [`ConfigError::InvalidHeader`] if a header is not valid HTTP
    /// - [`ConfigError::InvalidRateLimit`] if the rate limit is out of range
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let available = self.credentials.available();
        if available.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        let auth_mode = match self.auth_mode {
            Some(mask) if mask.is_empty() || !available.contains(mask) => {
                return Err(ConfigError::UnsupportedAuthMode {
                    mask: mask.to_string(),
                });
            }
            Some(mask) => mask,
            None => self.credentials.default_mask(),
        };

        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        reqwest::Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let (rate, burst) = self.rate_limit.unwrap_or((DEFAULT_RATE, DEFAULT_BURST));
        rate_limit::validate(rate, burst)?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("cloudflare-api-rust/{SDK_VERSION}"));

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &user_agent)?);
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ConfigError::InvalidHeader { name: name.clone() })?;
            default_headers.append(header_name, header_value(name, value)?);
        }

        Ok(ClientConfig {
            base_url,
            user_agent,
            default_headers,
            credentials: self.credentials,
            auth_mode,
            retry_policy: self.retry_policy.unwrap_or_default(),
            rate,
            burst,
            debug: self.debug,
            timeout: self.timeout,
            http_client: self.http_client,
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader {
        name: name.to_string(),
    })
}

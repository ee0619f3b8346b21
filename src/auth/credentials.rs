//! Credential storage and per-request header selection.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::auth::AuthMask;
use crate::config::{ApiEmail, ApiKey, ApiToken, UserServiceKey};
use crate::error::ConfigError;

/// Header carrying the global API key.
pub const X_AUTH_KEY: &str = "X-Auth-Key";
/// Header carrying the account email.
pub const X_AUTH_EMAIL: &str = "X-Auth-Email";
/// Header carrying the origin CA user service key.
pub const X_AUTH_USER_SERVICE_KEY: &str = "X-Auth-User-Service-Key";

/// Replacement text for secrets in debug dumps.
pub const REDACTED: &str = "[redacted]";

/// The secrets a client may authenticate with.
///
/// Any combination may be configured. The client's default [`AuthMask`]
/// activates exactly one of them, and a request may override the mask to
/// attach others.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    key_email: Option<(ApiKey, ApiEmail)>,
    token: Option<ApiToken>,
    user_service_key: Option<UserServiceKey>,
}

impl Credentials {
    /// Creates an empty credential set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the global API key and email pair.
    #[must_use]
    pub fn with_key_email(mut self, key: ApiKey, email: ApiEmail) -> Self {
        self.key_email = Some((key, email));
        self
    }

    /// Sets the scoped API token.
    #[must_use]
    pub fn with_token(mut self, token: ApiToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the user service key.
    #[must_use]
    pub fn with_user_service_key(mut self, key: UserServiceKey) -> Self {
        self.user_service_key = Some(key);
        self
    }

    /// Returns the API key and email, if configured.
    #[must_use]
    pub fn key_email(&self) -> Option<(&ApiKey, &ApiEmail)> {
        self.key_email.as_ref().map(|(key, email)| (key, email))
    }

    /// Returns the API token, if configured.
    #[must_use]
    pub const fn token(&self) -> Option<&ApiToken> {
        self.token.as_ref()
    }

    /// Returns the user service key, if configured.
    #[must_use]
    pub const fn user_service_key(&self) -> Option<&UserServiceKey> {
        self.user_service_key.as_ref()
    }

    /// Returns the mask of every scheme that has a secret configured.
    #[must_use]
    pub const fn available(&self) -> AuthMask {
        let mut bits = 0;
        if self.key_email.is_some() {
            bits |= AuthMask::KEY_EMAIL.bits();
        }
        if self.user_service_key.is_some() {
            bits |= AuthMask::USER_SERVICE_KEY.bits();
        }
        if self.token.is_some() {
            bits |= AuthMask::TOKEN.bits();
        }
        AuthMask::from_bits_truncate(bits)
    }

    /// Picks the single scheme used when a request does not override the mask.
    ///
    /// A token wins over key/email, which wins over the user service key.
    #[must_use]
    pub const fn default_mask(&self) -> AuthMask {
        if self.token.is_some() {
            AuthMask::TOKEN
        } else if self.key_email.is_some() {
            AuthMask::KEY_EMAIL
        } else if self.user_service_key.is_some() {
            AuthMask::USER_SERVICE_KEY
        } else {
            AuthMask::NONE
        }
    }
}

/// Pre-rendered auth headers plus the redaction list.
///
/// Header values are built once at client construction so that attaching
/// them per request cannot fail.
#[derive(Clone)]
pub(crate) struct Authenticator {
    key_email: Option<(HeaderValue, HeaderValue)>,
    user_service_key: Option<HeaderValue>,
    bearer: Option<HeaderValue>,
    secrets: Vec<String>,
}

impl Authenticator {
    pub(crate) fn new(credentials: &Credentials) -> Result<Self, ConfigError> {
        let mut secrets = Vec::new();

        let key_email = match credentials.key_email() {
            Some((key, email)) => {
                secrets.push(key.as_ref().to_string());
                secrets.push(email.as_ref().to_string());
                Some((
                    sensitive_value(X_AUTH_KEY, key.as_ref())?,
                    sensitive_value(X_AUTH_EMAIL, email.as_ref())?,
                ))
            }
            None => None,
        };

        let user_service_key = match credentials.user_service_key() {
            Some(key) => {
                secrets.push(key.as_ref().to_string());
                Some(sensitive_value(X_AUTH_USER_SERVICE_KEY, key.as_ref())?)
            }
            None => None,
        };

        let bearer = match credentials.token() {
            Some(token) => {
                secrets.push(token.as_ref().to_string());
                Some(sensitive_value(
                    AUTHORIZATION.as_str(),
                    &format!("Bearer {}", token.as_ref()),
                )?)
            }
            None => None,
        };

        Ok(Self {
            key_email,
            user_service_key,
            bearer,
            secrets,
        })
    }

    /// Appends the headers selected by `mask`.
    ///
    /// Bits without a configured secret are skipped.
    pub(crate) fn apply(&self, mask: AuthMask, headers: &mut HeaderMap) {
        if mask.contains(AuthMask::KEY_EMAIL) {
            match &self.key_email {
                Some((key, email)) => {
                    headers.insert(HeaderName::from_static("x-auth-key"), key.clone());
                    headers.insert(HeaderName::from_static("x-auth-email"), email.clone());
                }
                None => tracing::warn!(scheme = "KEY_EMAIL", "auth scheme requested without credentials"),
            }
        }
        if mask.contains(AuthMask::USER_SERVICE_KEY) {
            match &self.user_service_key {
                Some(key) => {
                    headers.insert(
                        HeaderName::from_static("x-auth-user-service-key"),
                        key.clone(),
                    );
                }
                None => tracing::warn!(
                    scheme = "USER_SERVICE_KEY",
                    "auth scheme requested without credentials"
                ),
            }
        }
        if mask.contains(AuthMask::TOKEN) {
            match &self.bearer {
                Some(value) => {
                    headers.insert(AUTHORIZATION, value.clone());
                }
                None => tracing::warn!(scheme = "TOKEN", "auth scheme requested without credentials"),
            }
        }
    }

    /// Replaces every configured secret in `text` with [`REDACTED`].
    pub(crate) fn redact(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), REDACTED))
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("key_email", &self.key_email.is_some())
            .field("user_service_key", &self.user_service_key.is_some())
            .field("token", &self.bearer.is_some())
            .finish_non_exhaustive()
    }
}

fn sensitive_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    let mut value = HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader {
        name: name.to_string(),
    })?;
    value.set_sensitive(true);
    Ok(value)
}

//! Validated newtype wrappers for credential values.
//!
//! Each wrapper rejects empty input on construction. The secret-bearing
//! wrappers mask their value in `Debug` output so they never leak into logs.

use crate::error::ConfigError;
use std::fmt;

/// A validated global API key, sent as `X-Auth-Key`.
///
/// # Example
///
/// ```rust
/// use cloudflare_api::ApiKey;
///
/// let key = ApiKey::new("deadbeef").unwrap();
/// assert_eq!(key.as_ref(), "deadbeef");
/// assert_eq!(format!("{:?}", key), "ApiKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredentials`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyCredentials);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(*****)")
    }
}

/// The account email paired with an [`ApiKey`], sent as `X-Auth-Email`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiEmail(String);

impl ApiEmail {
    /// Creates a new validated account email.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredentials`] if the email is empty.
    pub fn new(email: impl Into<String>) -> Result<Self, ConfigError> {
        let email = email.into();
        if email.is_empty() {
            return Err(ConfigError::EmptyCredentials);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for ApiEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated scoped API token, sent as `Authorization: Bearer <token>`.
///
/// # Example
///
/// ```rust
/// use cloudflare_api::ApiToken;
///
/// let token = ApiToken::new("my-token").unwrap();
/// assert_eq!(format!("{:?}", token), "ApiToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a new validated API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyApiToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(*****)")
    }
}

/// A validated origin CA user service key, sent as `X-Auth-User-Service-Key`.
#[derive(Clone, PartialEq, Eq)]
pub struct UserServiceKey(String);

impl UserServiceKey {
    /// Creates a new validated user service key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUserServiceKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyUserServiceKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for UserServiceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserServiceKey(*****)")
    }
}

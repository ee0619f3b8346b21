//! Construction-time error types for the Cloudflare API client.
//!
//! Every fallible step of building a [`Client`](crate::Client) reports a
//! [`ConfigError`]. Errors raised while a request is in flight use
//! [`Error`](crate::Error) instead.
//!
//! # Example
//!
//! ```rust
//! use cloudflare_api::{ApiToken, ConfigError};
//!
//! let result = ApiToken::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiToken)));
//! ```

use thiserror::Error;

/// Errors that can occur while building a client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key or email was empty.
    #[error("invalid credentials: key & email must not be empty")]
    EmptyCredentials,

    /// API token was empty.
    #[error("invalid credentials: API Token must not be empty")]
    EmptyApiToken,

    /// User service key was empty.
    #[error("invalid credentials: user service key must not be empty")]
    EmptyUserServiceKey,

    /// No credentials were supplied to the builder.
    #[error("missing credentials: configure an API key and email, an API token, or a user service key")]
    MissingCredentials,

    /// The requested auth mask selects a scheme with no configured secret.
    #[error("auth mode {mask} selects credentials that are not configured")]
    UnsupportedAuthMode {
        /// The offending mask, rendered as a bit list.
        mask: String,
    },

    /// The base URL could not be parsed.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The URL that was provided.
        url: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A default header name or value is not valid HTTP.
    #[error("invalid header '{name}'")]
    InvalidHeader {
        /// The header name that was provided.
        name: String,
    },

    /// Retry policy bounds are inconsistent.
    #[error("invalid retry policy: {reason}")]
    InvalidRetryPolicy {
        /// The violated bound.
        reason: &'static str,
    },

    /// Rate limiter parameters are out of range.
    #[error("invalid rate limit: {reason}")]
    InvalidRateLimit {
        /// The violated bound.
        reason: &'static str,
    },

    /// The underlying HTTP transport could not be created.
    #[error("failed to build HTTP transport: {reason}")]
    HttpTransport {
        /// Error reported by the transport builder.
        reason: String,
    },
}

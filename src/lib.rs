//! # Cloudflare API Rust Client
//!
//! The request execution core of a client for the Cloudflare v4 REST API.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Validated newtypes for credentials, with secrets masked in debug output
//! - Three authentication schemes selectable per request with [`AuthMask`]
//! - A shared token-bucket [`RateLimiter`] and exponential-backoff retries
//! - Cancellation and deadlines for every call via [`Context`]
//! - A closed error taxonomy ([`ErrorKind`]) carrying the API's error codes
//! - Envelope decoding and auto-pagination for list endpoints
//!
//! ## Quick Start
//!
//! ```rust
//! use cloudflare_api::{ApiToken, ClientConfig, Client};
//!
//! let config = ClientConfig::builder()
//!     .api_token(ApiToken::new("your-api-token").unwrap())
//!     .rate_limit(10.0, 5)
//!     .build()
//!     .unwrap();
//!
//! let client = Client::from_config(config).unwrap();
//! assert_eq!(client.config().base_url(), "https://api.cloudflare.com/client/v4");
//! ```
//!
//! ## Making API Requests
//!
//! ```rust,ignore
//! use cloudflare_api::{Client, Context, ErrorKind, HttpMethod};
//! use cloudflare_api::rest::ResourceScope;
//!
//! let client = Client::with_api_token("your-api-token")?;
//! let ctx = Context::new();
//!
//! let zone_id = client.zone_id_by_name(&ctx, "example.com").await?;
//! let path = ResourceScope::zone(&zone_id).path("settings/ssl")?;
//!
//! match client.raw(&ctx, HttpMethod::Get, &path, None, Default::default()).await {
//!     Ok(envelope) => println!("{:?}", envelope.result),
//!     Err(e) if e.kind() == ErrorKind::Authentication => eprintln!("token lacks permission"),
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: newtypes and builders validate on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use auth::{AuthMask, Credentials};
pub use config::{
    ApiEmail, ApiKey, ApiToken, ClientConfig, ClientConfigBuilder, RetryPolicy, UserServiceKey,
    DEFAULT_BASE_URL,
};
pub use error::ConfigError;

// Re-export request execution types
pub use clients::{
    ApiResponse, Client, Context, ContextError, Error, ErrorDetails, ErrorKind, HttpMethod,
    RateLimiter, Request, RequestBody, RequestBuilder, TransportError,
};

// Re-export envelope types
pub use rest::{decode_envelope, Envelope, RawEnvelope, ResourceScope, ResponseInfo, ResultInfo};

//! Request execution for the Cloudflare API.
//!
//! This module holds the transport-facing half of the crate: the client
//! handle, the retrying executor, the rate limiter, per-call contexts and
//! the error taxonomy.
//!
//! # Overview
//!
//! - [`Client`]: the shared handle every call goes through
//! - [`Context`]: cancellation and deadline for one call
//! - [`RateLimiter`]: token bucket shared by clones of a client
//! - [`Request`], [`RequestBody`], [`HttpMethod`]: request description
//! - [`ApiResponse`]: status, headers and raw body of a response
//! - [`Error`], [`ErrorKind`], [`ErrorDetails`]: failure classification
//!
//! # Retry Behavior
//!
//! - **Transport failures, 429 and 5xx**: retried with exponential backoff
//!   up to the policy's `max_retries`
//! - **Other non-2xx**: classified and returned immediately
//! - **Context cancelled or past deadline**: returned immediately, at any
//!   point of the pipeline
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use cloudflare_api::{Client, Context, HttpMethod, RequestBody};
//! use serde_json::json;
//!
//! let client = Client::with_api_token("token")?;
//! let ctx = Context::new().with_timeout(Duration::from_secs(30));
//!
//! let body = RequestBody::json(&json!({"purge_everything": true}))?;
//! client
//!     .execute(&ctx, HttpMethod::Post, "/zones/abc/purge_cache", Some(body))
//!     .await?;
//! ```

pub(crate) mod context;
pub(crate) mod errors;
pub(crate) mod http_client;
pub(crate) mod http_request;
pub(crate) mod http_response;
pub(crate) mod rate_limit;

pub use context::{Context, ContextError};
pub use errors::{
    Error, ErrorDetails, ErrorKind, TransportError, ERR_INTERNAL_SERVICE, ERR_MARSHAL_BODY,
    ERR_RATE_LIMIT_RETRIES, ERR_UNMARSHAL_BODY, ERR_UNMARSHAL_ERROR_BODY,
};
pub use http_client::{Client, SDK_VERSION};
pub use http_request::{HttpMethod, Request, RequestBody, RequestBuilder};
pub use http_response::{ApiResponse, CF_RAY};
pub use rate_limit::{RateLimiter, DEFAULT_BURST, DEFAULT_RATE};

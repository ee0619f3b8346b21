//! HTTP request types for the Cloudflare API client.
//!
//! This module provides the [`Request`] type and its builder, used with
//! [`Client::send`](crate::Client::send) when a call needs more than the
//! shorthand `execute` methods offer.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::auth::AuthMask;
use crate::clients::errors::{Error, ERR_MARSHAL_BODY};

/// HTTP methods used by the v4 API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl HttpMethod {
    /// Returns the method name in upper case.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body.
///
/// JSON and byte bodies are buffered and can be re-sent on retry. A stream
/// is consumed by the first attempt, so a request with a stream body is
/// never retried.
#[derive(Debug)]
pub enum RequestBody {
    /// A JSON document, sent with `Content-Type: application/json` unless
    /// the caller sets another type.
    Json(serde_json::Value),
    /// Raw bytes, sent verbatim.
    Bytes(Vec<u8>),
    /// A streaming body.
    Stream(reqwest::Body),
}

impl RequestBody {
    /// Serializes `value` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns a transport error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| Error::transport(ERR_MARSHAL_BODY, e))
    }

    /// Wraps raw bytes.
    #[must_use]
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Wraps a streaming body.
    #[must_use]
    pub fn stream(body: impl Into<reqwest::Body>) -> Self {
        Self::Stream(body.into())
    }

    /// Returns `true` if this body can be sent more than once.
    #[must_use]
    pub const fn is_replayable(&self) -> bool {
        !matches!(self, Self::Stream(_))
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// A request to be sent to the API.
///
/// Use [`Request::builder`] to construct requests with the builder pattern.
///
/// # Example
///
/// ```rust
/// use cloudflare_api::{AuthMask, HttpMethod, Request};
/// use serde_json::json;
///
/// let request = Request::builder(HttpMethod::Post, "/zones/abc/purge_cache")
///     .body(json!({"purge_everything": true}))
///     .auth(AuthMask::TOKEN)
///     .header("X-Request-Source", "deploy")
///     .build()
///     .unwrap();
///
/// assert_eq!(request.method, HttpMethod::Post);
/// assert!(request.body.is_some());
/// ```
#[derive(Debug)]
pub struct Request {
    /// The HTTP method.
    pub method: HttpMethod,
    /// Path relative to the base URL, including any query string.
    pub path: String,
    /// The request body, if any.
    pub body: Option<RequestBody>,
    /// Auth schemes to attach. `None` uses the client's default.
    pub auth: Option<AuthMask>,
    /// Headers layered over the client defaults.
    pub headers: HeaderMap,
}

impl Request {
    /// Creates a new builder for constructing a `Request`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug)]
pub struct RequestBuilder {
    method: HttpMethod,
    path: String,
    body: Option<RequestBody>,
    auth: Option<AuthMask>,
    headers: HeaderMap,
    pending_headers: Vec<(String, String)>,
}

impl RequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            auth: None,
            headers: HeaderMap::new(),
            pending_headers: Vec::new(),
        }
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Overrides the client's default auth mask for this request.
    #[must_use]
    pub const fn auth(mut self, mask: AuthMask) -> Self {
        self.auth = Some(mask);
        self
    }

    /// Adds a single header. Validated when the request is built.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pending_headers.push((key.into(), value.into()));
        self
    }

    /// Merges an already validated header map.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Builds the [`Request`].
    ///
    /// # Errors
    ///
    /// Returns a request error if a header added via
    /// [`header`](Self::header) is not a valid HTTP header.
    pub fn build(self) -> Result<Request, Error> {
        let mut headers = self.headers;
        for (key, value) in self.pending_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| Error::invalid_request(format!("invalid header name '{key}'")))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|_| Error::invalid_request(format!("invalid value for header '{key}'")))?;
            headers.append(name, value);
        }

        Ok(Request {
            method: self.method,
            path: self.path,
            body: self.body,
            auth: self.auth,
            headers,
        })
    }
}

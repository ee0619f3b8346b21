//! The standard response envelope.
//!
//! Every JSON endpoint of the v4 API wraps its payload as:
//!
//! ```json
//! {
//!   "success": true,
//!   "errors": [],
//!   "messages": [],
//!   "result": { ... },
//!   "result_info": { "page": 1, "per_page": 20, "total_pages": 3, "count": 20, "total_count": 55 }
//! }
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clients::errors::{Error, ERR_UNMARSHAL_BODY};

/// One entry of an envelope's `errors` or `messages` list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// Numeric error or message code. Zero when the server sent none.
    #[serde(default)]
    pub code: i64,
    /// Human readable text.
    #[serde(default)]
    pub message: String,
    /// Link to documentation for this code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    /// JSON pointer to the offending request field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ResponseInfoSource>,
    /// Nested causes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_chain: Vec<ResponseInfo>,
}

/// Where in the request an error originated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfoSource {
    /// JSON pointer into the request body.
    #[serde(default)]
    pub pointer: String,
}

impl ResponseInfo {
    /// Creates an entry with just a code and message.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if this entry or any nested cause carries `code`.
    #[must_use]
    pub fn chain_contains(&self, code: i64) -> bool {
        self.code == code || self.error_chain.iter().any(|e| e.chain_contains(code))
    }
}

impl fmt::Display for ResponseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code == 0 {
            f.write_str(&self.message)
        } else {
            write!(f, "{} ({})", self.message, self.code)
        }
    }
}

/// Opaque cursors for cursor-based pagination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    /// Cursor for the previous page.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub before: String,
    /// Cursor for the next page. Empty when there is none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub after: String,
}

/// Pagination metadata returned with list results.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    /// The page that was returned, starting at 1.
    #[serde(default)]
    pub page: u32,
    /// Items per page.
    #[serde(default)]
    pub per_page: u32,
    /// Number of pages available.
    #[serde(default)]
    pub total_pages: u32,
    /// Items on this page.
    #[serde(default)]
    pub count: u32,
    /// Items across all pages.
    #[serde(default, rename = "total_count")]
    pub total: u32,
    /// Cursor echoed back by some endpoints.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cursor: String,
    /// Cursors for cursor-based endpoints.
    #[serde(default)]
    pub cursors: Cursors,
}

impl ResultInfo {
    /// Returns `true` when the page-based listing has no further pages.
    ///
    /// With `total_pages` known the last page is done. Without it the
    /// listing is done once `page * per_page` reaches `total`. With neither
    /// there is nothing to go on and the listing is treated as done.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        if self.total_pages > 0 {
            return self.page >= self.total_pages;
        }
        if self.per_page > 0 {
            return self.page.saturating_mul(self.per_page) >= self.total;
        }
        true
    }

    /// Returns the metadata advanced by one page, or unchanged if done.
    #[must_use]
    pub fn next(&self) -> Self {
        if self.is_done() {
            return self.clone();
        }
        Self {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    /// Returns `true` if either a next page or a next cursor exists.
    #[must_use]
    pub fn has_more_pages(&self) -> bool {
        !self.cursors.after.is_empty() || !self.is_done()
    }
}

/// A decoded envelope with a typed result.
///
/// Use `Envelope<Option<T>>` for endpoints that may omit `result` or send
/// `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The server's success flag.
    #[serde(default)]
    pub success: bool,
    /// Errors reported by the server.
    #[serde(default)]
    pub errors: Vec<ResponseInfo>,
    /// Informational messages.
    #[serde(default)]
    pub messages: Vec<ResponseInfo>,
    /// The endpoint's payload.
    pub result: T,
    /// Pagination metadata for list endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_info: Option<ResultInfo>,
}

/// An envelope whose result is left as raw JSON.
pub type RawEnvelope = Envelope<Option<serde_json::Value>>;

/// Just the status fields of an envelope, for classifying responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnvelopeStatus {
    #[serde(default)]
    pub(crate) success: Option<bool>,
    #[serde(default)]
    pub(crate) errors: Vec<ResponseInfo>,
    #[serde(default)]
    pub(crate) messages: Vec<ResponseInfo>,
}

/// Decodes a successful response body into a typed envelope.
///
/// # Errors
///
/// Returns a transport error if the body is not a valid envelope for `T`.
///
/// # Example
///
/// ```rust
/// use cloudflare_api::decode_envelope;
///
/// let body = br#"{"success":true,"errors":[],"messages":[],"result":{"id":"abc"}}"#;
/// let envelope = decode_envelope::<serde_json::Value>(body).unwrap();
/// assert_eq!(envelope.result["id"], "abc");
/// ```
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>, Error> {
    serde_json::from_slice(body).map_err(|e| Error::transport(ERR_UNMARSHAL_BODY, e))
}

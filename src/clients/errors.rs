//! Error taxonomy for API calls.
//!
//! Every failed call yields one [`Error`]. Its [`ErrorKind`] is drawn from a
//! closed set so callers can branch without parsing text:
//!
//! - [`ErrorKind::Transport`]: connection, decode or cancellation failures
//! - [`ErrorKind::Authentication`]: HTTP 403
//! - [`ErrorKind::Authorization`]: HTTP 401
//! - [`ErrorKind::NotFound`]: HTTP 404
//! - [`ErrorKind::RateLimit`]: HTTP 429, including exhausted retries
//! - [`ErrorKind::Request`]: any other 4xx, or a rejected envelope
//! - [`ErrorKind::Service`]: HTTP 5xx
//!
//! Every kind carries [`ErrorDetails`]: the HTTP status (zero when the
//! request never got a response), the `cf-ray` trace id, and the envelope's
//! `errors` and `messages` lists verbatim.
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudflare_api::{Error, ErrorKind};
//!
//! match client.execute(&ctx, HttpMethod::Get, "/zones/abc", None).await {
//!     Ok(body) => println!("{} bytes", body.len()),
//!     Err(e) if e.kind() == ErrorKind::NotFound => println!("no such zone"),
//!     Err(e) if e.error_code_contains(10000) => println!("bad credentials"),
//!     Err(e) => return Err(e),
//! }
//! ```

use std::fmt;

use thiserror::Error;

use crate::clients::context::ContextError;
use crate::rest::envelope::ResponseInfo;

/// Message used for every 5xx response.
pub const ERR_INTERNAL_SERVICE: &str = "internal service error";

/// Message used when retries end on a 429.
pub const ERR_RATE_LIMIT_RETRIES: &str = "exceeded available rate limit retries";

/// Message used when a non-2xx body is not a valid envelope.
pub const ERR_UNMARSHAL_ERROR_BODY: &str = "error unmarshalling the JSON response error body";

/// Message used when a 2xx body cannot be decoded into the expected type.
pub const ERR_UNMARSHAL_BODY: &str = "error unmarshalling the JSON response";

/// Message used when a request body cannot be encoded as JSON.
pub const ERR_MARSHAL_BODY: &str = "error marshalling params to JSON";

/// The closed set of failure categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection, decode, or cancellation failure.
    Transport,
    /// The credentials were understood but rejected (HTTP 403).
    Authentication,
    /// The request lacked valid credentials (HTTP 401).
    Authorization,
    /// HTTP 404.
    NotFound,
    /// HTTP 429.
    RateLimit,
    /// Any other client-side rejection.
    Request,
    /// HTTP 5xx.
    Service,
}

impl ErrorKind {
    /// Returns the stable string tag for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::RateLimit => "rate_limit",
            Self::Request => "request",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payload shared by every error kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorDetails {
    status: u16,
    trace_id: Option<String>,
    errors: Vec<ResponseInfo>,
    messages: Vec<ResponseInfo>,
    error_codes: Vec<i64>,
    error_messages: Vec<String>,
}

impl ErrorDetails {
    /// Builds details from a decoded envelope.
    #[must_use]
    pub fn new(
        status: u16,
        trace_id: Option<String>,
        errors: Vec<ResponseInfo>,
        messages: Vec<ResponseInfo>,
    ) -> Self {
        let error_codes = errors.iter().map(|e| e.code).collect();
        let error_messages = errors.iter().map(|e| e.message.clone()).collect();
        Self {
            status,
            trace_id,
            errors,
            messages,
            error_codes,
            error_messages,
        }
    }

    /// Builds details holding a single synthesized message with no code.
    #[must_use]
    pub fn from_message(status: u16, trace_id: Option<String>, message: impl Into<String>) -> Self {
        Self::new(status, trace_id, vec![ResponseInfo::new(0, message)], Vec::new())
    }

    /// HTTP status, or 0 if no response was received.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The `cf-ray` trace id of the failed response.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// The envelope's `errors` list.
    #[must_use]
    pub fn errors(&self) -> &[ResponseInfo] {
        &self.errors
    }

    /// The envelope's `messages` list.
    #[must_use]
    pub fn messages(&self) -> &[ResponseInfo] {
        &self.messages
    }

    /// Codes of every entry in `errors`, in order.
    #[must_use]
    pub fn error_codes(&self) -> &[i64] {
        &self.error_codes
    }

    /// Messages of every entry in `errors`, in order.
    #[must_use]
    pub fn error_messages(&self) -> &[String] {
        &self.error_messages
    }

    /// Returns `true` if any top-level error carries `code`.
    #[must_use]
    pub fn error_code_contains(&self, code: i64) -> bool {
        self.error_codes.contains(&code)
    }

    /// Returns `true` if any top-level error message contains `needle`.
    #[must_use]
    pub fn error_message_contains(&self, needle: &str) -> bool {
        self.error_messages.iter().any(|m| m.contains(needle))
    }

    /// Returns `true` if `code` appears anywhere in an error chain.
    #[must_use]
    pub fn internal_error_code_is(&self, code: i64) -> bool {
        self.errors.iter().any(|e| e.chain_contains(code))
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "request failed with HTTP status {}", self.status);
        }
        for (i, info) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{info}")?;
        }
        Ok(())
    }
}

/// Underlying causes of a [`ErrorKind::Transport`] error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP transport failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The call's context was cancelled or ran out of time.
    #[error(transparent)]
    Context(#[from] ContextError),

    /// JSON encoding or decoding failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Query parameters could not be encoded.
    #[error(transparent)]
    Query(#[from] serde_urlencoded::ser::Error),
}

/// A failed API call.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP 403.
    #[error("{0}")]
    Authentication(ErrorDetails),

    /// HTTP 401.
    #[error("{0}")]
    Authorization(ErrorDetails),

    /// HTTP 404, or a lookup that matched nothing.
    #[error("{0}")]
    NotFound(ErrorDetails),

    /// HTTP 429.
    #[error("{0}")]
    RateLimit(ErrorDetails),

    /// Other client-side rejections.
    #[error("{0}")]
    Request(ErrorDetails),

    /// HTTP 5xx.
    #[error("{0}")]
    Service(ErrorDetails),

    /// The request could not be completed or its response not understood.
    #[error("{details}: {source}")]
    Transport {
        /// Status and summary of the failure.
        details: ErrorDetails,
        /// What went wrong underneath.
        #[source]
        source: TransportError,
    },

    /// Another error annotated with the operation that produced it.
    #[error("{operation}: {source}")]
    Operation {
        /// Name of the failing operation.
        operation: String,
        /// The original error.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Maps an HTTP status to its error kind.
    ///
    /// 401 is authorization, 403 is authentication, 404 is not found,
    /// 429 is rate limit, 5xx is service, everything else is request.
    #[must_use]
    pub fn for_status(status: u16, details: ErrorDetails) -> Self {
        match status {
            401 => Self::Authorization(details),
            403 => Self::Authentication(details),
            404 => Self::NotFound(details),
            429 => Self::RateLimit(details),
            500..=599 => Self::Service(details),
            _ => Self::Request(details),
        }
    }

    /// Builds a transport error with no HTTP status.
    pub fn transport(message: impl Into<String>, source: impl Into<TransportError>) -> Self {
        Self::Transport {
            details: ErrorDetails::from_message(0, None, message),
            source: source.into(),
        }
    }

    /// Builds a transport error tied to a received response.
    pub fn transport_with_status(
        status: u16,
        trace_id: Option<String>,
        message: impl Into<String>,
        source: impl Into<TransportError>,
    ) -> Self {
        Self::Transport {
            details: ErrorDetails::from_message(status, trace_id, message),
            source: source.into(),
        }
    }

    /// Builds a request-kind error for a failure detected before sending.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::Request(ErrorDetails::from_message(0, None, message))
    }

    /// Wraps this error with the name of the operation that produced it.
    ///
    /// The kind, status and envelope data are unchanged.
    #[must_use]
    pub fn with_operation(self, operation: impl Into<String>) -> Self {
        Self::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// Returns the error's category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::RateLimit(_) => ErrorKind::RateLimit,
            Self::Request(_) => ErrorKind::Request,
            Self::Service(_) => ErrorKind::Service,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Operation { source, .. } => source.kind(),
        }
    }

    /// Returns the payload shared by every kind.
    #[must_use]
    pub fn details(&self) -> &ErrorDetails {
        match self {
            Self::Authentication(d)
            | Self::Authorization(d)
            | Self::NotFound(d)
            | Self::RateLimit(d)
            | Self::Request(d)
            | Self::Service(d)
            | Self::Transport { details: d, .. } => d,
            Self::Operation { source, .. } => source.details(),
        }
    }

    /// HTTP status, or 0 if no response was received.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.details().status()
    }

    /// The `cf-ray` trace id, when the server sent one.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.details().trace_id()
    }

    /// The envelope's `errors` list.
    #[must_use]
    pub fn errors(&self) -> &[ResponseInfo] {
        self.details().errors()
    }

    /// The envelope's `messages` list.
    #[must_use]
    pub fn messages(&self) -> &[ResponseInfo] {
        self.details().messages()
    }

    /// Returns `true` if any top-level error carries `code`.
    #[must_use]
    pub fn error_code_contains(&self, code: i64) -> bool {
        self.details().error_code_contains(code)
    }

    /// Returns `true` if any top-level error message contains `needle`.
    #[must_use]
    pub fn error_message_contains(&self, needle: &str) -> bool {
        self.details().error_message_contains(needle)
    }

    /// Returns `true` if `code` appears anywhere in an error chain.
    #[must_use]
    pub fn internal_error_code_is(&self, code: i64) -> bool {
        self.details().internal_error_code_is(code)
    }

    /// Returns `true` for 4xx responses.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Returns `true` if the server rate limited the call.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        self.kind() == ErrorKind::RateLimit
    }
}

// Verify Error is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn details(status: u16, errors: Vec<ResponseInfo>) -> ErrorDetails {
        ErrorDetails::new(status, Some("ray-123".to_string()), errors, Vec::new())
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (401, ErrorKind::Authorization),
            (403, ErrorKind::Authentication),
            (404, ErrorKind::NotFound),
            (429, ErrorKind::RateLimit),
            (400, ErrorKind::Request),
            (409, ErrorKind::Request),
            (500, ErrorKind::Service),
            (503, ErrorKind::Service),
        ];
        for (status, kind) in cases {
            let error = Error::for_status(status, details(status, Vec::new()));
            assert_eq!(error.kind(), kind, "status {status}");
            assert_eq!(error.status(), status);
        }
    }

    #[test]
    fn test_display_joins_messages_and_codes() {
        let error = Error::for_status(
            400,
            details(
                400,
                vec![
                    ResponseInfo::new(1003, "Invalid or missing zone id."),
                    ResponseInfo::new(0, "no code here"),
                    ResponseInfo::new(6003, "Invalid request headers"),
                ],
            ),
        );
        assert_eq!(
            error.to_string(),
            "Invalid or missing zone id. (1003), no code here, Invalid request headers (6003)"
        );
    }

    #[test]
    fn test_display_without_errors_mentions_status() {
        let error = Error::for_status(418, details(418, Vec::new()));
        assert_eq!(error.to_string(), "request failed with HTTP status 418");
    }

    #[test]
    fn test_raw_codes_and_messages_follow_errors() {
        let d = details(
            403,
            vec![
                ResponseInfo::new(10000, "Authentication error"),
                ResponseInfo::new(9109, "Invalid access token"),
            ],
        );
        assert_eq!(d.error_codes(), &[10000, 9109]);
        assert_eq!(
            d.error_messages(),
            &["Authentication error".to_string(), "Invalid access token".to_string()]
        );
        assert!(d.error_code_contains(9109));
        assert!(!d.error_code_contains(1));
        assert!(d.error_message_contains("access token"));
    }

    #[test]
    fn test_internal_error_code_searches_chain() {
        let mut outer = ResponseInfo::new(1000, "outer");
        outer.error_chain = vec![ResponseInfo::new(1001, "inner")];
        let error = Error::for_status(400, details(400, vec![outer]));

        assert!(error.internal_error_code_is(1001));
        assert!(error.internal_error_code_is(1000));
        assert!(!error.internal_error_code_is(1002));
        assert!(!error.error_code_contains(1001));
    }

    #[test]
    fn test_transport_error_exposes_cause() {
        let error = Error::transport("request cancelled", ContextError::Canceled);

        assert_eq!(error.kind(), ErrorKind::Transport);
        assert_eq!(error.status(), 0);
        assert_eq!(error.to_string(), "request cancelled: context canceled");
        assert!(matches!(
            error,
            Error::Transport {
                source: TransportError::Context(ContextError::Canceled),
                ..
            }
        ));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_with_operation_keeps_kind_and_details() {
        let inner = Error::for_status(404, details(404, vec![ResponseInfo::new(7003, "Not found")]));
        let error = inner.with_operation("list dns records");

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.status(), 404);
        assert_eq!(error.trace_id(), Some("ray-123"));
        assert_eq!(error.to_string(), "list dns records: Not found (7003)");
    }

    #[test]
    fn test_client_error_and_rate_limited() {
        let limited = Error::for_status(429, details(429, Vec::new()));
        assert!(limited.is_client_error());
        assert!(limited.is_rate_limited());

        let service = Error::for_status(502, details(502, Vec::new()));
        assert!(!service.is_client_error());
        assert!(!service.is_rate_limited());
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ErrorKind::NotFound.as_str(), "not_found");
        assert_eq!(ErrorKind::RateLimit.to_string(), "rate_limit");
        assert_eq!(ErrorKind::Transport.as_str(), "transport");
    }
}

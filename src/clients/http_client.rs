//! The client handle and request executor.
//!
//! This module provides [`Client`], which owns the configuration, the
//! transport, the rate limiter and the authenticator, and runs every call
//! through the same pipeline:
//!
//! 1. Serialize the body once so it can be replayed on retry
//! 2. Layer headers: client defaults, then per-call extras, then auth
//! 3. Per attempt: back off, take a rate-limiter token, send, read the body
//! 4. Retry transport failures, 429 and 5xx; classify everything else

use std::fmt::{self, Write as _};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::auth::credentials::Authenticator;
use crate::auth::AuthMask;
use crate::clients::context::{Context, ContextError};
use crate::clients::errors::{
    Error, ErrorDetails, ERR_INTERNAL_SERVICE, ERR_MARSHAL_BODY, ERR_RATE_LIMIT_RETRIES,
    ERR_UNMARSHAL_ERROR_BODY,
};
use crate::clients::http_request::{HttpMethod, Request, RequestBody};
use crate::clients::http_response::ApiResponse;
use crate::clients::rate_limit::RateLimiter;
use crate::config::{ApiEmail, ApiKey, ApiToken, ClientConfig, ClientConfigBuilder, UserServiceKey};
use crate::error::ConfigError;
use crate::rest::envelope::{decode_envelope, Envelope, EnvelopeStatus, RawEnvelope};

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path suffix of the firewall filter validation endpoint, whose error
/// bodies are plain text rather than envelopes.
const FILTER_VALIDATION_SUFFIX: &str = "/filters/validate-expr";

/// Client for the Cloudflare v4 API.
///
/// Cloning is cheap and every clone shares the same configuration,
/// connection pool and rate limiter.
///
/// # Thread Safety
///
/// `Client` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use cloudflare_api::{Client, Context, HttpMethod};
///
/// let client = Client::with_api_token("my-token")?;
/// let ctx = Context::new();
///
/// let body = client.execute(&ctx, HttpMethod::Get, "/user/tokens/verify", None).await?;
/// println!("{}", String::from_utf8_lossy(&body));
/// ```
#[derive(Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    auth: Arc<Authenticator>,
}

// Verify Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

enum Failure {
    Transport(reqwest::Error),
    Status(ApiResponse),
}

impl Client {
    /// Creates a client authenticating with a global API key and email.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredentials`] if either value is empty.
    pub fn new(api_key: impl Into<String>, email: impl Into<String>) -> Result<Self, ConfigError> {
        let config = ClientConfig::builder()
            .api_key_email(ApiKey::new(api_key)?, ApiEmail::new(email)?)
            .build()?;
        Self::from_config(config)
    }

    /// Creates a client authenticating with a scoped API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiToken`] if the token is empty.
    pub fn with_api_token(token: impl Into<String>) -> Result<Self, ConfigError> {
        let config = ClientConfig::builder()
            .api_token(ApiToken::new(token)?)
            .build()?;
        Self::from_config(config)
    }

    /// Creates a client authenticating with a user service key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUserServiceKey`] if the key is empty.
    pub fn with_user_service_key(key: impl Into<String>) -> Result<Self, ConfigError> {
        let config = ClientConfig::builder()
            .user_service_key(UserServiceKey::new(key)?)
            .build()?;
        Self::from_config(config)
    }

    /// Starts a configuration for [`Client::from_config`].
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfig::builder()
    }

    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] if a credential cannot be sent
    /// as a header, or [`ConfigError::HttpTransport`] if the transport cannot
    /// be created.
    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigError> {
        let auth = Authenticator::new(config.credentials())?;
        let limiter = RateLimiter::new(config.rate(), config.burst())?;

        let http = match config.http_client() {
            Some(client) => client.clone(),
            None => {
                let mut builder = reqwest::Client::builder().use_rustls_tls();
                if let Some(timeout) = config.timeout() {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| ConfigError::HttpTransport {
                    reason: e.to_string(),
                })?
            }
        };

        tracing::debug!(
            base_url = %config.base_url(),
            auth_mode = %config.auth_mode(),
            "created cloudflare client"
        );

        Ok(Self {
            config: Arc::new(config),
            http,
            limiter: Arc::new(limiter),
            auth: Arc::new(auth),
        })
    }

    /// Returns the client's configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the rate limiter shared by all clones of this client.
    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Performs a call with the default auth mask and returns the body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] classified by [`ErrorKind`](crate::ErrorKind).
    pub async fn execute(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<Vec<u8>, Error> {
        self.execute_with_headers(ctx, method, path, body, HeaderMap::new())
            .await
    }

    /// Performs a call with a specific auth mask and returns the body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] classified by [`ErrorKind`](crate::ErrorKind).
    pub async fn execute_with_auth(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        auth: AuthMask,
    ) -> Result<Vec<u8>, Error> {
        let request = Request {
            method,
            path: path.to_string(),
            body,
            auth: Some(auth),
            headers: HeaderMap::new(),
        };
        Ok(self.send(ctx, request).await?.body)
    }

    /// Performs a call with extra headers and returns the body.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] classified by [`ErrorKind`](crate::ErrorKind).
    pub async fn execute_with_headers(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        headers: HeaderMap,
    ) -> Result<Vec<u8>, Error> {
        Ok(self
            .execute_complete(ctx, method, path, body, headers)
            .await?
            .body)
    }

    /// Performs a call with extra headers and returns the full response.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] classified by [`ErrorKind`](crate::ErrorKind).
    pub async fn execute_complete(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        headers: HeaderMap,
    ) -> Result<ApiResponse, Error> {
        let request = Request {
            method,
            path: path.to_string(),
            body,
            auth: None,
            headers,
        };
        self.send(ctx, request).await
    }

    /// Performs a call and decodes the envelope, leaving `result` as raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] classified by [`ErrorKind`](crate::ErrorKind), or
    /// a transport error if the body is not an envelope.
    pub async fn raw(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        headers: HeaderMap,
    ) -> Result<RawEnvelope, Error> {
        self.execute_envelope(ctx, method, path, body, headers).await
    }

    /// Performs a call and decodes the envelope with a typed result.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] classified by [`ErrorKind`](crate::ErrorKind), or
    /// a transport error if the body does not decode as `Envelope<T>`.
    pub async fn execute_envelope<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        method: HttpMethod,
        path: &str,
        body: Option<RequestBody>,
        headers: HeaderMap,
    ) -> Result<Envelope<T>, Error> {
        let response = self
            .execute_complete(ctx, method, path, body, headers)
            .await?;
        decode_envelope(&response.body)
    }

    /// Sends a fully described request through the retry pipeline.
    ///
    /// JSON and byte bodies are serialized once and replayed on every
    /// attempt. A stream body gets exactly one attempt.
    ///
    /// # Errors
    ///
    /// - Transport error if the context ends, an attempt times out, the body
    ///   cannot be encoded, or the last attempt failed below HTTP
    /// - Rate limit error if retries ran out on 429
    /// - Service error if retries ran out on 5xx
    /// - Authorization, authentication, not found or request error for
    ///   401, 403, 404 and other non-2xx statuses
    /// - Request error for a 2xx envelope with `success: false`
    pub async fn send(&self, ctx: &Context, request: Request) -> Result<ApiResponse, Error> {
        let Request {
            method,
            path,
            body,
            auth,
            headers: extra,
        } = request;

        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        let url = format!("{}{}", self.config.base_url(), path);
        let mask = auth.unwrap_or_else(|| self.config.auth_mode());

        let (payload, mut stream) = match body {
            None => (None, None),
            Some(RequestBody::Json(value)) => {
                let bytes =
                    serde_json::to_vec(&value).map_err(|e| Error::transport(ERR_MARSHAL_BODY, e))?;
                (Some(bytes), None)
            }
            Some(RequestBody::Bytes(bytes)) => (Some(bytes), None),
            Some(RequestBody::Stream(body)) => (None, Some(body)),
        };
        let replayable = stream.is_none();
        let has_body = payload.is_some() || stream.is_some();
        let headers = self.request_headers(&extra, has_body, mask);

        let policy = self.config.retry_policy();
        let max_retries = if replayable { policy.max_retries() } else { 0 };

        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                let delay = policy.backoff(attempt);
                tracing::debug!(
                    %method,
                    path = %path,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "backing off before retry"
                );
                ctx.sleep(delay)
                    .await
                    .map_err(|e| Error::transport("request cancelled during retry backoff", e))?;
            }

            self.limiter
                .wait(ctx)
                .await
                .map_err(|e| Error::transport("error waiting for rate limiter", e))?;

            let mut builder = self
                .http
                .request(method.to_reqwest(), url.as_str())
                .headers(headers.clone());
            if let Some(bytes) = &payload {
                builder = builder.body(bytes.clone());
            } else if let Some(body) = stream.take() {
                builder = builder.body(body);
            }
            self.dump_request(method, &url, &headers, payload.as_deref(), !replayable);

            let failure = match round_trip(ctx, builder).await {
                Err(cause) => return Err(Error::transport("HTTP request aborted", cause)),
                Ok(Err(err)) if err.is_timeout() => {
                    tracing::warn!(%method, path = %path, attempt, error = %err, "HTTP request timed out");
                    return Err(Error::transport("HTTP request timed out", err));
                }
                Ok(Err(err)) => {
                    tracing::warn!(%method, path = %path, attempt, error = %err, "HTTP request failed");
                    Failure::Transport(err)
                }
                Ok(Ok(response)) => {
                    self.dump_response(&response);
                    if response.status == 429 || response.status >= 500 {
                        tracing::warn!(
                            %method,
                            path = %path,
                            attempt,
                            status = response.status,
                            trace_id = response.trace_id().unwrap_or_default(),
                            "retryable response"
                        );
                        Failure::Status(response)
                    } else {
                        return classify(&path, response);
                    }
                }
            };

            if attempt >= max_retries {
                return Err(exhausted(&path, failure));
            }
            attempt += 1;
        }
    }

    fn request_headers(&self, extra: &HeaderMap, has_body: bool, mask: AuthMask) -> HeaderMap {
        let mut headers = self.config.default_headers().clone();
        for name in extra.keys() {
            headers.remove(name);
        }
        for (name, value) in extra {
            headers.append(name.clone(), value.clone());
        }
        if has_body && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        self.auth.apply(mask, &mut headers);
        headers
    }

    fn dump_request(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &HeaderMap,
        body: Option<&[u8]>,
        streaming: bool,
    ) {
        if !self.config.debug() {
            return;
        }
        let mut dump = format!("{method} {url}\n");
        write_headers(
            &mut dump,
            headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.to_str().unwrap_or("<binary>"))),
        );
        if let Some(body) = body {
            dump.push('\n');
            dump.push_str(&String::from_utf8_lossy(body));
        } else if streaming {
            dump.push_str("\n<stream>");
        }
        tracing::debug!(request = %self.auth.redact(&dump), "cloudflare api request");
    }

    fn dump_response(&self, response: &ApiResponse) {
        if !self.config.debug() {
            return;
        }
        let mut dump = format!("{} {}\n", response.status, response.status_text);
        let mut names: Vec<&String> = response.headers.keys().collect();
        names.sort();
        write_headers(
            &mut dump,
            names.into_iter().flat_map(|name| {
                response.headers[name]
                    .iter()
                    .map(move |value| (name.as_str(), value.as_str()))
            }),
        );
        dump.push('\n');
        dump.push_str(&response.text());
        tracing::debug!(response = %self.auth.redact(&dump), "cloudflare api response");
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url())
            .field("auth_mode", &self.config.auth_mode())
            .field("retry_policy", &self.config.retry_policy())
            .finish_non_exhaustive()
    }
}

async fn round_trip(
    ctx: &Context,
    builder: reqwest::RequestBuilder,
) -> Result<Result<ApiResponse, reqwest::Error>, ContextError> {
    ctx.run(async move {
        let response = builder.send().await?;
        ApiResponse::read(response).await
    })
    .await
}

fn write_headers<'a>(dump: &mut String, headers: impl Iterator<Item = (&'a str, &'a str)>) {
    for (name, value) in headers {
        let _ = writeln!(dump, "{name}: {value}");
    }
}

fn is_filter_validation(path: &str) -> bool {
    path.split('?')
        .next()
        .is_some_and(|p| p.ends_with(FILTER_VALIDATION_SUFFIX))
}

/// Turns a final, non-retryable response into a result.
fn classify(path: &str, response: ApiResponse) -> Result<ApiResponse, Error> {
    if !response.is_ok() {
        return Err(classify_error(path, &response));
    }
    if let Ok(status) = serde_json::from_slice::<EnvelopeStatus>(&response.body) {
        if status.success == Some(false) {
            return Err(Error::Request(ErrorDetails::new(
                response.status,
                response.trace_id().map(String::from),
                status.errors,
                status.messages,
            )));
        }
    }
    Ok(response)
}

fn classify_error(path: &str, response: &ApiResponse) -> Error {
    let status = response.status;
    let trace_id = response.trace_id().map(String::from);

    if is_filter_validation(path) {
        return Error::for_status(
            status,
            ErrorDetails::from_message(status, trace_id, response.text()),
        );
    }
    if status >= 500 {
        return Error::Service(ErrorDetails::from_message(
            status,
            trace_id,
            ERR_INTERNAL_SERVICE,
        ));
    }

    match serde_json::from_slice::<EnvelopeStatus>(&response.body) {
        Ok(envelope) => Error::for_status(
            status,
            ErrorDetails::new(status, trace_id, envelope.errors, envelope.messages),
        ),
        Err(e) => Error::transport_with_status(status, trace_id, ERR_UNMARSHAL_ERROR_BODY, e),
    }
}

fn exhausted(path: &str, failure: Failure) -> Error {
    match failure {
        Failure::Transport(err) => Error::transport("HTTP request failed", err),
        Failure::Status(response) if response.status == 429 => {
            Error::RateLimit(ErrorDetails::from_message(
                response.status,
                response.trace_id().map(String::from),
                ERR_RATE_LIMIT_RETRIES,
            ))
        }
        Failure::Status(response) => classify_error(path, &response),
    }
}

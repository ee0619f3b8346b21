//! Integration tests for the request executor.
//!
//! These tests run the client against a local mock server and verify
//! header layering, retries, error classification and cancellation.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cloudflare_api::{
    ApiEmail, ApiKey, ApiToken, AuthMask, Client, ClientConfig, Context, ContextError, Error,
    ErrorKind, HttpMethod, Request, RequestBody, RetryPolicy, TransportError, UserServiceKey,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Match, Mock, MockServer, ResponseTemplate};

/// Matches requests that do not carry the given header.
struct HeaderAbsent(&'static str);

impl Match for HeaderAbsent {
    fn matches(&self, request: &wiremock::Request) -> bool {
        !request.headers.contains_key(self.0)
    }
}

fn fast_retries() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(10)).unwrap()
}

fn token_client(server: &MockServer) -> Client {
    let config = ClientConfig::builder()
        .api_token(ApiToken::new("test-token").unwrap())
        .base_url(server.uri())
        .retry_policy(fast_retries())
        .rate_limit(f64::INFINITY, 1)
        .build()
        .unwrap();
    Client::from_config(config).unwrap()
}

fn success(result: serde_json::Value) -> serde_json::Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result
    })
}

fn failure(code: i64, message: &str) -> serde_json::Value {
    json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null
    })
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn test_get_sends_bearer_token_and_no_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/tokens/verify"))
        .and(header("authorization", "Bearer test-token"))
        .and(HeaderAbsent("content-type"))
        .and(HeaderAbsent("x-auth-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({"status": "active"}))))
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let body = client
        .execute(&Context::new(), HttpMethod::Get, "/user/tokens/verify", None)
        .await
        .unwrap();

    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["result"]["status"], "active");
}

#[tokio::test]
async fn test_json_body_sets_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/abc/purge_cache"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"purge_everything": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({"id": "abc"}))))
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let body = RequestBody::json(&json!({"purge_everything": true})).unwrap();
    client
        .execute(&Context::new(), HttpMethod::Post, "/zones/abc/purge_cache", Some(body))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_user_agent_and_default_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(header("user-agent", "deploy-bot/1.0"))
        .and(header("x-team", "edge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_token(ApiToken::new("test-token").unwrap())
        .base_url(server.uri())
        .user_agent("deploy-bot/1.0")
        .header("X-Team", "edge")
        .rate_limit(f64::INFINITY, 1)
        .build()
        .unwrap();
    let client = Client::from_config(config).unwrap();

    client
        .execute(&Context::new(), HttpMethod::Get, "/zones", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_extra_headers_override_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(header("user-agent", "one-off/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let mut headers = HeaderMap::new();
    headers.insert("user-agent", HeaderValue::from_static("one-off/2.0"));

    client
        .execute_with_headers(&Context::new(), HttpMethod::Get, "/zones", None, headers)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_auth_mask_override_attaches_selected_schemes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/certificates"))
        .and(header("x-auth-key", "global-key"))
        .and(header("x-auth-email", "user@example.com"))
        .and(header("x-auth-user-service-key", "v1.0-service"))
        .and(HeaderAbsent("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({"id": "cert"}))))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_key_email(
            ApiKey::new("global-key").unwrap(),
            ApiEmail::new("user@example.com").unwrap(),
        )
        .api_token(ApiToken::new("test-token").unwrap())
        .user_service_key(UserServiceKey::new("v1.0-service").unwrap())
        .base_url(server.uri())
        .rate_limit(f64::INFINITY, 1)
        .build()
        .unwrap();
    let client = Client::from_config(config).unwrap();

    let body = RequestBody::json(&json!({"hostnames": ["example.com"]})).unwrap();
    client
        .execute_with_auth(
            &Context::new(),
            HttpMethod::Post,
            "/certificates",
            Some(body),
            AuthMask::KEY_EMAIL | AuthMask::USER_SERVICE_KEY,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_with_request_builder() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/zones/abc/settings/ssl"))
        .and(header("x-request-source", "tests"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cf-ray", "8a1b2c3d-SJC")
                .set_body_json(success(json!({"id": "ssl", "value": "strict"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let request = Request::builder(HttpMethod::Patch, "zones/abc/settings/ssl")
        .body(json!({"value": "strict"}))
        .header("X-Request-Source", "tests")
        .build()
        .unwrap();

    let response = client.send(&Context::new(), request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.trace_id(), Some("8a1b2c3d-SJC"));
}

#[tokio::test]
async fn test_raw_decodes_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts/acc/workers/scripts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [{"code": 0, "message": "ok"}],
            "result": [{"id": "worker-a"}],
            "result_info": {"page": 1, "per_page": 20, "total_pages": 1, "count": 1, "total_count": 1}
        })))
        .mount(&server)
        .await;

    let client = token_client(&server);
    let envelope = client
        .raw(
            &Context::new(),
            HttpMethod::Get,
            "/accounts/acc/workers/scripts",
            None,
            HeaderMap::new(),
        )
        .await
        .unwrap();

    assert!(envelope.success);
    assert_eq!(envelope.result.unwrap()[0]["id"], "worker-a");
    assert_eq!(envelope.result_info.unwrap().total, 1);
}

#[tokio::test]
async fn test_non_json_success_body_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/abc/dns_records/export"))
        .respond_with(ResponseTemplate::new(200).set_body_string("example.com. 300 IN A 192.0.2.1"))
        .mount(&server)
        .await;

    let client = token_client(&server);
    let body = client
        .execute(&Context::new(), HttpMethod::Get, "/zones/abc/dns_records/export", None)
        .await
        .unwrap();
    assert_eq!(body, b"example.com. 300 IN A 192.0.2.1");
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test]
async fn test_rate_limited_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(429).set_body_json(failure(971, "Please wait")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([]))))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_token(ApiToken::new("test-token").unwrap())
        .base_url(server.uri())
        .retry_policy(RetryPolicy::new(3, Duration::from_millis(50), Duration::from_secs(5)).unwrap())
        .rate_limit(f64::INFINITY, 1)
        .build()
        .unwrap();
    let client = Client::from_config(config).unwrap();

    let start = Instant::now();
    let result = client
        .execute(&Context::new(), HttpMethod::Get, "/zones", None)
        .await;
    let elapsed = start.elapsed();

    assert!(result.is_ok());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
    // a single backoff of the minimum delay
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_secs(1));
}

#[tokio::test]
async fn test_transport_timeout_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success(json!([])))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_token(ApiToken::new("test-token").unwrap())
        .base_url(server.uri())
        .retry_policy(fast_retries())
        .rate_limit(f64::INFINITY, 1)
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let client = Client::from_config(config).unwrap();

    let err = client
        .execute(&Context::new(), HttpMethod::Get, "/zones", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(
        err,
        Error::Transport {
            source: TransportError::Http(ref e),
            ..
        } if e.is_timeout()
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let err = client
        .execute(&Context::new(), HttpMethod::Get, "/zones", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.status(), 503);
    assert_eq!(err.to_string(), "internal service error");
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(429).set_body_json(failure(971, "Please wait")))
        .expect(4)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let err = client
        .execute(&Context::new(), HttpMethod::Get, "/zones", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RateLimit);
    assert!(err.is_rate_limited());
    assert_eq!(err.to_string(), "exceeded available rate limit retries");
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/abc/dns_records"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(failure(9005, "Content for A record is invalid.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let body = RequestBody::json(&json!({"type": "A", "content": "nope"})).unwrap();
    let err = client
        .execute(&Context::new(), HttpMethod::Post, "/zones/abc/dns_records", Some(body))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert!(err.is_client_error());
    assert!(err.error_code_contains(9005));
}

#[tokio::test]
async fn test_stream_body_is_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/accounts/acc/workers/scripts/hello"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let body = RequestBody::stream(reqwest::Body::from("export default {}"));
    let err = client
        .execute(
            &Context::new(),
            HttpMethod::Put,
            "/accounts/acc/workers/scripts/hello",
            Some(body),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Service);
}

// ============================================================================
// Classification
// ============================================================================

#[tokio::test]
async fn test_not_found_is_classified_with_codes_and_trace_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("cf-ray", "7d3f2a1b-LHR")
                .set_body_json(failure(7003, "Not found")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let err = client
        .execute(&Context::new(), HttpMethod::Get, "/zones/missing", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status(), 404);
    assert_eq!(err.trace_id(), Some("7d3f2a1b-LHR"));
    assert!(err.error_code_contains(7003));
    assert_eq!(err.details().error_messages(), &["Not found".to_string()]);
    assert!(err.to_string().starts_with("Not found (7003)"));
}

#[tokio::test]
async fn test_auth_statuses_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forbidden"))
        .respond_with(ResponseTemplate::new(403).set_body_json(failure(10000, "Authentication error")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/unauthorized"))
        .respond_with(ResponseTemplate::new(401).set_body_json(failure(10001, "Unauthorized")))
        .mount(&server)
        .await;

    let client = token_client(&server);
    let ctx = Context::new();

    let forbidden = client
        .execute(&ctx, HttpMethod::Get, "/forbidden", None)
        .await
        .unwrap_err();
    assert_eq!(forbidden.kind(), ErrorKind::Authentication);

    let unauthorized = client
        .execute(&ctx, HttpMethod::Get, "/unauthorized", None)
        .await
        .unwrap_err();
    assert_eq!(unauthorized.kind(), ErrorKind::Authorization);
}

#[tokio::test]
async fn test_unsuccessful_envelope_with_2xx_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(failure(1000, "Something went wrong")))
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let err = client
        .execute(&Context::new(), HttpMethod::Get, "/zones", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Request);
    assert_eq!(err.status(), 200);
}

#[tokio::test]
async fn test_undecodable_error_body_is_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(400).set_body_string("<html>Bad Request</html>"))
        .mount(&server)
        .await;

    let client = token_client(&server);
    let err = client
        .execute(&Context::new(), HttpMethod::Get, "/zones", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), 400);
    assert!(matches!(
        err,
        Error::Transport {
            source: TransportError::Json(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_filter_validation_error_uses_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/abc/filters/validate-expr"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Filter parsing error (1:1)"))
        .mount(&server)
        .await;

    let client = token_client(&server);
    let body = RequestBody::json(&json!({"expression": "nonsense"})).unwrap();
    let err = client
        .execute(
            &Context::new(),
            HttpMethod::Post,
            "/zones/abc/filters/validate-expr",
            Some(body),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Filter parsing error (1:1)");
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_during_backoff() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_token(ApiToken::new("test-token").unwrap())
        .base_url(server.uri())
        .retry_policy(RetryPolicy::new(3, Duration::from_secs(10), Duration::from_secs(30)).unwrap())
        .rate_limit(f64::INFINITY, 1)
        .build()
        .unwrap();
    let client = Client::from_config(config).unwrap();

    let ctx = Context::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let err = client
        .execute(&ctx, HttpMethod::Get, "/zones", None)
        .await
        .unwrap_err();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(matches!(
        err,
        Error::Transport {
            source: TransportError::Context(ContextError::Canceled),
            ..
        }
    ));
}

#[tokio::test]
async fn test_expired_deadline_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([]))))
        .expect(0)
        .mount(&server)
        .await;

    let client = token_client(&server);
    let ctx = Context::new().with_timeout(Duration::ZERO);
    let err = client
        .execute(&ctx, HttpMethod::Get, "/zones", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Transport {
            source: TransportError::Context(ContextError::DeadlineExceeded),
            ..
        }
    ));
}

#[tokio::test]
async fn test_clones_share_rate_limiter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!([]))))
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_token(ApiToken::new("test-token").unwrap())
        .base_url(server.uri())
        .rate_limit(5.0, 1)
        .build()
        .unwrap();
    let client = Client::from_config(config).unwrap();
    let clone = client.clone();
    let ctx = Context::new();

    let start = Instant::now();
    client.execute(&ctx, HttpMethod::Get, "/zones", None).await.unwrap();
    clone.execute(&ctx, HttpMethod::Get, "/zones", None).await.unwrap();
    client.execute(&ctx, HttpMethod::Get, "/zones", None).await.unwrap();

    // burst of one, then 200ms per token
    assert!(start.elapsed() >= Duration::from_millis(350));
}

// ============================================================================
// Debug dumps
// ============================================================================

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_debug_dumps_redact_secrets() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/tokens/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success(json!({
            "echo": "super-secret-token"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .api_token(ApiToken::new("super-secret-token").unwrap())
        .base_url(server.uri())
        .rate_limit(f64::INFINITY, 1)
        .debug(true)
        .build()
        .unwrap();
    let client = Client::from_config(config).unwrap();
    let body = RequestBody::json(&json!({"token": "super-secret-token"})).unwrap();

    client
        .execute(&Context::new(), HttpMethod::Post, "/user/tokens/verify", Some(body))
        .await
        .unwrap();

    let output = logs.contents();
    assert!(output.contains("cloudflare api request"));
    assert!(output.contains("cloudflare api response"));
    assert!(output.contains("POST "));
    assert!(output.contains("Bearer [redacted]"));
    assert!(!output.contains("super-secret-token"));
}

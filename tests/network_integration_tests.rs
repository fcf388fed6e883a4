use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use fxconv::networking::{
    CallError, Endpoint, EndpointResult, HttpBody, HttpEncoding, HttpHeader, HttpHeaders,
    HttpMethod, HttpMonitor, Network, NetworkError, ResponseStream, StreamHandler,
};
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{
        body_string, body_string_contains, header, header_exists, method, path, query_param,
    },
};

// ============================================================================
// Helpers
// ============================================================================

#[derive(Clone, Default)]
struct ApiEndpoint {
    base_url: String,
    path: String,
    method: HttpMethod,
    body: Option<HttpBody>,
    encoding: HttpEncoding,
    timeout: Option<Duration>,
    follow_redirects: bool,
    follow_ssl_redirects: bool,
    handler: Option<Arc<dyn StreamHandler>>,
    monitors: Option<Vec<Arc<dyn HttpMonitor>>>,
}

impl ApiEndpoint {
    fn new(server: &MockServer, path: &str) -> Self {
        Self {
            base_url: server.uri(),
            path: path.to_string(),
            ..Default::default()
        }
    }

    fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    fn param(mut self, key: &str, value: &str) -> Self {
        self.body
            .get_or_insert_with(HttpBody::new)
            .insert(key.to_string(), value.to_string());
        self
    }
}

impl Endpoint for ApiEndpoint {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn body(&self) -> Option<HttpBody> {
        self.body.clone()
    }

    fn encoding(&self) -> HttpEncoding {
        self.encoding
    }

    fn request_timeout(&self) -> Duration {
        self.timeout.unwrap_or(fxconv::networking::DEFAULT_REQUEST_TIMEOUT)
    }

    fn follow_redirects(&self) -> bool {
        self.follow_redirects
    }

    fn follow_ssl_redirects(&self) -> bool {
        self.follow_ssl_redirects
    }

    fn stream_handler(&self) -> Option<Arc<dyn StreamHandler>> {
        self.handler.clone()
    }

    fn monitors(&self) -> Option<Vec<Arc<dyn HttpMonitor>>> {
        self.monitors.clone()
    }
}

/// Collects every streamed byte.
#[derive(Default)]
struct CollectingHandler {
    received: Mutex<Vec<u8>>,
}

#[async_trait]
impl StreamHandler for CollectingHandler {
    async fn on_stream(
        &self,
        _headers: Option<HttpHeaders>,
        mut stream: ResponseStream,
    ) -> io::Result<()> {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            self.received.lock().unwrap().extend_from_slice(&chunk);
        }
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl StreamHandler for FailingHandler {
    async fn on_stream(
        &self,
        _headers: Option<HttpHeaders>,
        _stream: ResponseStream,
    ) -> io::Result<()> {
        Err(io::Error::other("disk full"))
    }
}

/// Sets `released` once the stream it holds is dropped.
struct ReleaseGuard {
    stream: ResponseStream,
    released: Arc<AtomicBool>,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Reads one chunk, then fails.
#[derive(Default)]
struct FailAfterFirstChunk {
    released: Arc<AtomicBool>,
}

#[async_trait]
impl StreamHandler for FailAfterFirstChunk {
    async fn on_stream(
        &self,
        _headers: Option<HttpHeaders>,
        stream: ResponseStream,
    ) -> io::Result<()> {
        let mut guard = ReleaseGuard {
            stream,
            released: Arc::clone(&self.released),
        };
        guard.stream.next().await.transpose()?;
        Err(io::Error::other("disk full"))
    }
}

/// Adds a header to outgoing requests and records the status it saw.
struct TagMonitor {
    name: &'static str,
    seen: Mutex<Vec<String>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl TagMonitor {
    fn new(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            seen: Mutex::new(Vec::new()),
            log,
        }
    }
}

#[async_trait]
impl HttpMonitor for TagMonitor {
    async fn intercept_request(
        &self,
        mut request: reqwest::Request,
    ) -> io::Result<reqwest::Request> {
        let value = reqwest::header::HeaderValue::from_static(self.name);
        request.headers_mut().append("x-monitor", value);
        self.log.lock().unwrap().push(format!("request:{}", self.name));
        Ok(request)
    }

    async fn intercept_response(
        &self,
        response: reqwest::Response,
    ) -> io::Result<reqwest::Response> {
        self.seen.lock().unwrap().push(response.status().to_string());
        self.log.lock().unwrap().push(format!("response:{}", self.name));
        Ok(response)
    }
}

/// Rejects every request before it is sent.
struct OfflineMonitor;

#[async_trait]
impl HttpMonitor for OfflineMonitor {
    async fn intercept_request(
        &self,
        _request: reqwest::Request,
    ) -> io::Result<reqwest::Request> {
        Err(io::Error::new(io::ErrorKind::NotConnected, "offline mode"))
    }
}

/// Passes requests through, fails on the response with a timeout.
struct SlowResponseMonitor;

#[async_trait]
impl HttpMonitor for SlowResponseMonitor {
    async fn intercept_response(
        &self,
        _response: reqwest::Response,
    ) -> io::Result<reqwest::Response> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "response hook gave up"))
    }
}

fn network() -> Network {
    Network::builder().build().unwrap()
}

fn expect_error(result: EndpointResult) -> fxconv::networking::EndpointError {
    match result {
        EndpointResult::Error(e) => e,
        other => panic!("expected an error result, got {other:?}"),
    }
}

// ============================================================================
// Success Statuses
// ============================================================================

#[tokio::test]
async fn test_ok_body_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"success":true}"#))
        .mount(&server)
        .await;

    let result = assert_ok!(network().execute(&ApiEndpoint::new(&server, "live")).await);
    assert_eq!(result, EndpointResult::response(Some(r#"{"success":true}"#.to_string())));
    assert!(result.has_data());
}

#[tokio::test]
async fn test_created_and_accepted_keep_body() {
    let server = MockServer::start().await;
    Mock::given(path("/created"))
        .respond_with(ResponseTemplate::new(201).set_body_string("made"))
        .mount(&server)
        .await;
    Mock::given(path("/accepted"))
        .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
        .mount(&server)
        .await;

    let network = network();
    let created = assert_ok!(network.execute(&ApiEndpoint::new(&server, "created")).await);
    let accepted = assert_ok!(network.execute(&ApiEndpoint::new(&server, "accepted")).await);
    assert_eq!(created, EndpointResult::response(Some("made".to_string())));
    assert_eq!(accepted, EndpointResult::response(Some("queued".to_string())));
}

#[tokio::test]
async fn test_blank_body_is_none() {
    let server = MockServer::start().await;
    Mock::given(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   "))
        .mount(&server)
        .await;
    Mock::given(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let network = network();
    let blank = assert_ok!(network.execute(&ApiEndpoint::new(&server, "blank")).await);
    let empty = assert_ok!(network.execute(&ApiEndpoint::new(&server, "empty")).await);
    assert_eq!(blank, EndpointResult::response(None));
    assert_eq!(empty, EndpointResult::response(None));
}

#[tokio::test]
async fn test_other_success_status_drops_body() {
    let server = MockServer::start().await;
    Mock::given(path("/partial"))
        .respond_with(ResponseTemplate::new(206).set_body_string("partial content"))
        .mount(&server)
        .await;

    let result = assert_ok!(network().execute(&ApiEndpoint::new(&server, "partial")).await);
    assert_eq!(result, EndpointResult::response(None));
}

// ============================================================================
// Error Statuses
// ============================================================================

#[tokio::test]
async fn test_error_status_without_body_uses_no_response() {
    let server = MockServer::start().await;
    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = assert_ok!(network().execute(&ApiEndpoint::new(&server, "missing")).await);
    let error = expect_error(result);
    assert_eq!(error.code, 404);
    assert_eq!(error.response, NetworkError::NoResponse.value());
    assert!(error.request_info.is_none());
    assert!(!error.handled);
}

#[tokio::test]
async fn test_error_status_with_payload() {
    let server = MockServer::start().await;
    Mock::given(path("/live"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("X-Trace", "abc")
                .set_body_string(
                    r#"{"success":false,"error":{"code":101,"info":"Invalid access key"},"extra":1}"#,
                ),
        )
        .mount(&server)
        .await;

    let result = assert_ok!(network().execute(&ApiEndpoint::new(&server, "live")).await);
    let error = expect_error(result);
    assert_eq!(error.code, 400);
    assert_eq!(error.error_code(), 101);
    assert_eq!(error.info(), Some("Invalid access key"));
    let headers = error.headers.expect("response headers");
    assert_eq!(headers.get("x-trace").map(|h| h.value.as_str()), Some("abc"));
}

#[tokio::test]
async fn test_error_status_with_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = assert_err!(network().execute(&ApiEndpoint::new(&server, "broken")).await);
    match err {
        CallError::ErrorParse { message, .. } => {
            assert_eq!(message, "Failed to parse error response.")
        }
        other => panic!("expected ErrorParse, got {other:?}"),
    }
}

// ============================================================================
// Transport Failures
// ============================================================================

#[tokio::test]
async fn test_timeout_is_classified() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        timeout: Some(Duration::from_millis(100)),
        ..ApiEndpoint::new(&server, "slow")
    };
    let result = assert_ok!(network().execute(&endpoint).await);
    let error = expect_error(result);
    assert_eq!(error.code, 0);
    assert_eq!(error.response, NetworkError::Timeout.value());
    assert!(error.request_info.is_some());
}

#[tokio::test]
async fn test_connection_refused_is_no_internet() {
    let endpoint = ApiEndpoint {
        base_url: "http://127.0.0.1:1".to_string(),
        path: "live".to_string(),
        ..Default::default()
    };

    let result = assert_ok!(network().execute(&endpoint).await);
    let error = expect_error(result);
    assert_eq!(error.code, 0);
    assert_eq!(error.error_code(), -2);
    assert_eq!(error.info(), Some("No internet connection."));

    let info = error.request_info.expect("request info");
    assert_eq!(info.method, HttpMethod::Get);
    assert_eq!(info.url, "http://127.0.0.1:1/live");
    assert!(!info.request_was_sent);
}

#[tokio::test]
async fn test_url_words_do_not_affect_classification() {
    for path in ["handshake", "tls/live", "ssl-certificates"] {
        let endpoint = ApiEndpoint {
            base_url: "http://127.0.0.1:1".to_string(),
            path: path.to_string(),
            ..Default::default()
        };

        let result = assert_ok!(network().execute(&endpoint).await);
        let error = expect_error(result);
        assert_eq!(error.error_code(), -2, "{path}");
    }
}

// ============================================================================
// Request Shape
// ============================================================================

#[tokio::test]
async fn test_get_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live"))
        .and(query_param("access_key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint::new(&server, "live").param("access_key", "secret");
    let result = assert_ok!(network().execute(&endpoint).await);
    assert_eq!(result, EndpointResult::response(Some("ok".to_string())));
}

#[tokio::test]
async fn test_post_sends_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("amount=10"))
        .respond_with(ResponseTemplate::new(201).set_body_string("done"))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint::new(&server, "convert")
        .method(HttpMethod::Post)
        .param("amount", "10");
    let result = assert_ok!(network().execute(&endpoint).await);
    assert_eq!(result, EndpointResult::response(Some("done".to_string())));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/convert"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_string(r#"{"amount":10,"code":"JPY"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        encoding: HttpEncoding::Json,
        ..ApiEndpoint::new(&server, "convert")
            .method(HttpMethod::Post)
            .param("a", r#"{"amount":10,"#)
            .param("b", r#""code":"JPY"}"#)
    };
    let result = assert_ok!(network().execute(&endpoint).await);
    assert_eq!(result, EndpointResult::response(Some("ok".to_string())));
}

#[tokio::test]
async fn test_global_headers_respect_method_scope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/live"))
        .and(header("x-client", "fxconv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let network = Network::builder()
        .header("X-Client", HttpHeader::new("fxconv"))
        .header("X-Post-Only", HttpHeader::scoped(HttpMethod::Post, "1"))
        .build()
        .unwrap();

    assert_ok!(network.execute(&ApiEndpoint::new(&server, "live")).await);
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("x-post-only"));
}

// ============================================================================
// Redirects
// ============================================================================

#[tokio::test]
async fn test_redirects_not_followed_by_default() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&server)
        .await;

    let result = assert_ok!(network().execute(&ApiEndpoint::new(&server, "old")).await);
    let error = expect_error(result);
    assert_eq!(error.code, 302);
    assert_eq!(error.response, NetworkError::NoResponse.value());
}

#[tokio::test]
async fn test_redirects_followed_when_enabled() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        follow_redirects: true,
        ..ApiEndpoint::new(&server, "old")
    };
    let result = assert_ok!(network().execute(&endpoint).await);
    assert_eq!(result, EndpointResult::response(Some("moved".to_string())));
}

#[tokio::test]
async fn test_same_scheme_redirects_followed() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        follow_redirects: true,
        follow_ssl_redirects: false,
        ..ApiEndpoint::new(&server, "old")
    };
    let result = assert_ok!(network().execute(&endpoint).await);
    assert_eq!(result, EndpointResult::response(Some("moved".to_string())));
}

#[tokio::test]
async fn test_scheme_switch_stops_without_ssl_redirects() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "https://127.0.0.1:1/secure"),
        )
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        follow_redirects: true,
        follow_ssl_redirects: false,
        ..ApiEndpoint::new(&server, "old")
    };
    let result = assert_ok!(network().execute(&endpoint).await);
    let error = expect_error(result);
    assert_eq!(error.code, 302);
    assert_eq!(error.response, NetworkError::NoResponse.value());
}

#[tokio::test]
async fn test_scheme_switch_followed_with_ssl_redirects() {
    let server = MockServer::start().await;
    Mock::given(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("Location", "https://127.0.0.1:1/secure"),
        )
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        follow_redirects: true,
        follow_ssl_redirects: true,
        ..ApiEndpoint::new(&server, "old")
    };

    // The redirect target refuses connections, so following it fails in transport.
    let result = assert_ok!(network().execute(&endpoint).await);
    let error = expect_error(result);
    assert_eq!(error.code, 0);
    assert!(error.request_info.is_some());
}

// ============================================================================
// Streaming
// ============================================================================

#[tokio::test]
async fn test_stream_handler_receives_body() {
    let server = MockServer::start().await;
    Mock::given(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("streamed bytes"))
        .mount(&server)
        .await;

    let handler = Arc::new(CollectingHandler::default());
    let endpoint = ApiEndpoint {
        handler: Some(handler.clone()),
        ..ApiEndpoint::new(&server, "download")
    };

    let result = assert_ok!(network().execute(&endpoint).await);
    assert_eq!(result, EndpointResult::response(None));
    assert_eq!(handler.received.lock().unwrap().as_slice(), b"streamed bytes");
}

#[tokio::test]
async fn test_stream_handler_failure_is_reported() {
    let server = MockServer::start().await;
    Mock::given(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("streamed bytes"))
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        handler: Some(Arc::new(FailingHandler)),
        ..ApiEndpoint::new(&server, "download")
    };

    let err = assert_err!(network().execute(&endpoint).await);
    assert!(matches!(err, CallError::Stream(_)));
}

#[tokio::test]
async fn test_stream_released_when_handler_fails() {
    let server = MockServer::start().await;
    Mock::given(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_string("streamed bytes"))
        .mount(&server)
        .await;

    let handler = Arc::new(FailAfterFirstChunk::default());
    let endpoint = ApiEndpoint {
        handler: Some(handler.clone()),
        ..ApiEndpoint::new(&server, "download")
    };

    let err = assert_err!(network().execute(&endpoint).await);
    assert!(matches!(err, CallError::Stream(_)));
    assert!(handler.released.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_streamed_error_body_uses_no_response() {
    let server = MockServer::start().await;
    Mock::given(path("/download"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let handler = Arc::new(CollectingHandler::default());
    let endpoint = ApiEndpoint {
        handler: Some(handler.clone()),
        ..ApiEndpoint::new(&server, "download")
    };

    let result = assert_ok!(network().execute(&endpoint).await);
    let error = expect_error(result);
    assert_eq!(error.code, 503);
    assert_eq!(error.response, NetworkError::NoResponse.value());
    assert_eq!(handler.received.lock().unwrap().as_slice(), b"maintenance");
}

// ============================================================================
// Monitors
// ============================================================================

#[tokio::test]
async fn test_monitors_wrap_the_call() {
    let server = MockServer::start().await;
    Mock::given(path("/live"))
        .and(header_exists("x-monitor"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let log = Arc::new(Mutex::new(Vec::new()));
    let outer = Arc::new(TagMonitor::new("outer", Arc::clone(&log)));
    let inner = Arc::new(TagMonitor::new("inner", Arc::clone(&log)));
    let endpoint = ApiEndpoint {
        monitors: Some(vec![outer.clone(), inner.clone()]),
        ..ApiEndpoint::new(&server, "live")
    };

    let result = assert_ok!(network().execute(&endpoint).await);
    assert_eq!(result, EndpointResult::response(Some("ok".to_string())));
    assert_eq!(
        *log.lock().unwrap(),
        ["request:outer", "request:inner", "response:inner", "response:outer"]
    );
    assert_eq!(*outer.seen.lock().unwrap(), ["200 OK"]);

    let requests = server.received_requests().await.unwrap();
    let tags: Vec<_> = requests[0].headers.get_all("x-monitor").iter().collect();
    assert_eq!(tags, ["outer", "inner"]);
}

#[tokio::test]
async fn test_request_hook_failure_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(path("/live"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        monitors: Some(vec![Arc::new(OfflineMonitor)]),
        ..ApiEndpoint::new(&server, "live")
    };

    let result = assert_ok!(network().execute(&endpoint).await);
    let error = expect_error(result);
    assert_eq!(error.code, 0);
    assert_eq!(error.response, NetworkError::NoInternetConnection.value());
    assert!(!error.request_info.expect("request info").request_was_sent);
}

#[tokio::test]
async fn test_response_hook_failure_is_classified() {
    let server = MockServer::start().await;
    Mock::given(path("/live"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let endpoint = ApiEndpoint {
        monitors: Some(vec![Arc::new(SlowResponseMonitor)]),
        ..ApiEndpoint::new(&server, "live")
    };

    let result = assert_ok!(network().execute(&endpoint).await);
    let error = expect_error(result);
    assert_eq!(error.response, NetworkError::Timeout.value());
    assert!(error.request_info.expect("request info").request_was_sent);
}

// ============================================================================
// Background Calls
// ============================================================================

#[tokio::test]
async fn test_call_delivers_result_to_callback() {
    let server = MockServer::start().await;
    Mock::given(path("/live"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let (tx, rx) = oneshot::channel();
    let handle = network().call(Arc::new(ApiEndpoint::new(&server, "live")), move |result| {
        let _ = tx.send(result);
    });
    assert!(handle.is_some());

    let result = assert_ok!(rx.await.unwrap());
    assert_eq!(result, EndpointResult::response(Some("ok".to_string())));
}

#[tokio::test]
async fn test_call_with_bad_url_runs_callback_immediately() {
    let endpoint = ApiEndpoint {
        base_url: "not a url".to_string(),
        path: "live".to_string(),
        ..Default::default()
    };

    let (tx, mut rx) = oneshot::channel();
    let handle = network().call(Arc::new(endpoint), move |result| {
        let _ = tx.send(result);
    });

    assert!(handle.is_none());
    let result = rx.try_recv().expect("callback already ran");
    assert!(matches!(result, Err(CallError::Construction(_))));
}

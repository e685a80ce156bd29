use async_trait::async_trait;
use rstest::{fixture, rstest};
use serde_json::{json, Value};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use urlmock_core::testing::wait_for_condition;
use urlmock_core::{
    HeaderMap, HttpMethod, MockHttpRequest, MockHttpResponder, MockResponder, MockUrlProtocol,
    PatternMatchingMockRequest, ProtocolClient, ResponseError, UrlRequest,
};
use urlmock_server::{MockServer, ServerConfig};

/// Responder that records when it is cancelled.
#[derive(Debug)]
struct CancelRecordingResponder {
    inner: MockHttpResponder,
    cancelled: Arc<AtomicBool>,
}

#[async_trait]
impl MockResponder for CancelRecordingResponder {
    async fn respond(&self, request: &UrlRequest, client: &dyn ProtocolClient) {
        self.inner.respond(request, client).await;
    }

    fn cancel_response(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.inner.cancel_response();
    }
}

#[fixture]
fn protocol() -> MockUrlProtocol {
    let protocol = MockUrlProtocol::new();
    protocol.enable();
    protocol
}

fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Should build client")
}

fn proxied_client(server: &MockServer) -> reqwest::Client {
    reqwest::Client::builder()
        .proxy(reqwest::Proxy::http(server.url()).expect("valid proxy URL"))
        .build()
        .expect("Should build client")
}

#[rstest]
#[tokio::test]
async fn test_serves_mock_at_base_url(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol.clone()).await.expect("Should start");
    let mock = protocol
        .expect_mock_http_get_request(&server.url_for("/users"), 200, Some(&json!([{"id": 1}])))
        .expect("Should register");

    let response = direct_client()
        .get(server.url_for("users"))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json; charset=utf-8")
    );
    let body: Value = response.json().await.expect("Should be JSON");
    assert_eq!(body, json!([{"id": 1}]));
    assert!(protocol.has_serviced_mock_request(&mock));
    assert_eq!(protocol.all_expected_mock_requests().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_serves_mock_as_proxy(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol.clone()).await.expect("Should start");
    protocol
        .expect_mock_http_post_request(
            "http://api.example.com/users?b=2&a=1",
            Some(&json!({"name": "John"})),
            201,
            Some(&json!({"id": 7})),
        )
        .expect("Should register");

    let response = proxied_client(&server)
        .post("http://api.example.com/users?a=1&b=2")
        .json(&json!({"name": "John"}))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.expect("Should be JSON");
    assert_eq!(body, json!({"id": 7}));
}

#[rstest]
#[tokio::test]
async fn test_fixture_headers_with_json_body_over_proxy(protocol: MockUrlProtocol) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    tokio::fs::write(
        dir.path().join("users.json"),
        r#"{
  "mocks": [
    {
      "method": "POST",
      "url": "http://api.example.com/users",
      "headers": { "X-Token": "abc" },
      "json": { "name": "John" },
      "response": { "status": 201 }
    }
  ]
}"#,
    )
    .await
    .expect("Should write");
    let pattern = format!("{}/*.json", dir.path().display());
    protocol.load_fixtures(&pattern).await.expect("Should load");

    let server = MockServer::start(protocol).await.expect("Should start");
    let response = proxied_client(&server)
        .post("http://api.example.com/users")
        .header("X-Token", "abc")
        .json(&json!({"name": "John"}))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 201);
}

#[rstest]
#[tokio::test]
async fn test_matches_request_headers(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol.clone()).await.expect("Should start");
    let mut mock = MockHttpRequest::get(&server.url_for("/secure")).expect("valid URL");
    mock.message_mut()
        .set_value_for_header_field("abc", "X-Token");
    let mock = Arc::new(mock.with_responder(Arc::new(MockHttpResponder::with_status(204))));
    protocol.expect_mock_request(mock);

    let client = direct_client();
    let wrong = client
        .get(server.url_for("/secure"))
        .header("X-Token", "nope")
        .send()
        .await
        .expect("Should respond");
    assert_eq!(wrong.status().as_u16(), 501);

    let right = client
        .get(server.url_for("/secure"))
        .header("X-Token", "abc")
        .send()
        .await
        .expect("Should respond");
    assert_eq!(right.status().as_u16(), 204);
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn test_unmatched_request_uses_unmatched_status(#[case] enabled: bool) {
    let protocol = MockUrlProtocol::new();
    if enabled {
        protocol.enable();
    }
    let config = ServerConfig {
        unmatched_status: 404,
        ..ServerConfig::default()
    };
    let server = MockServer::start_with_config(protocol, config)
        .await
        .expect("Should start");

    let response = direct_client()
        .get(server.url_for("/missing"))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 404);
    let text = response.text().await.expect("Should read body");
    assert!(text.contains("/missing"));
}

#[rstest]
#[tokio::test]
async fn test_intercepting_all_requests_reports_unexpected(protocol: MockUrlProtocol) {
    protocol.set_intercepts_all_requests(true);
    let server = MockServer::start(protocol).await.expect("Should start");

    let response = direct_client()
        .delete(server.url_for("/anything"))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 501);
    let text = response.text().await.expect("Should read body");
    assert!(text.starts_with("unexpected request: DELETE"));
}

#[rstest]
#[tokio::test]
async fn test_error_responder_becomes_bad_gateway(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol.clone()).await.expect("Should start");
    let error = ResponseError::new("NSURLErrorDomain", -1009, "offline");
    protocol
        .expect_mock_http_get_request_with_error(&server.url_for("/offline"), error.clone())
        .expect("Should register");

    let response = direct_client()
        .get(server.url_for("/offline"))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 502);
    let body: ResponseError = response.json().await.expect("Should be JSON");
    assert_eq!(body, error);
}

#[rstest]
#[tokio::test]
async fn test_streams_chunked_body(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol.clone()).await.expect("Should start");
    let headers: HeaderMap = [("Content-Type", "text/plain"), ("X-Chunked", "yes")]
        .into_iter()
        .collect();
    let responder = MockHttpResponder::with_chunks(
        200,
        headers,
        "The quick brown fox jumps over the lazy dog",
        4,
        Duration::from_millis(5),
    )
    .expect("Should build responder");
    let mock = MockHttpRequest::get(&server.url_for("/stream"))
        .expect("valid URL")
        .with_responder(Arc::new(responder));
    protocol.expect_mock_request(Arc::new(mock));

    let response = direct_client()
        .get(server.url_for("/stream"))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("x-chunked")
            .and_then(|v| v.to_str().ok()),
        Some("yes")
    );
    let text = response.text().await.expect("Should read body");
    assert_eq!(text, "The quick brown fox jumps over the lazy dog");
}

#[rstest]
#[tokio::test]
async fn test_pattern_mock_serves_repeatedly(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol.clone()).await.expect("Should start");
    let mock = PatternMatchingMockRequest::new(&server.url_for("/users/:id"), |_, params| {
        let id = params.get("id").cloned().unwrap_or_default();
        let responder = MockHttpResponder::with_status_and_json(200, &json!({ "id": id }))
            .expect("Should serialize");
        Arc::new(responder) as Arc<dyn MockResponder>
    })
    .expect("valid pattern")
    .with_http_methods([HttpMethod::Get]);
    protocol.expect_mock_request(Arc::new(mock));

    let client = direct_client();
    for id in ["1", "42"] {
        let response = client
            .get(server.url_for(&format!("/users/{id}")))
            .send()
            .await
            .expect("Should respond");
        let body: Value = response.json().await.expect("Should be JSON");
        assert_eq!(body, json!({ "id": id }));
    }

    let rejected = client
        .put(server.url_for("/users/1"))
        .send()
        .await
        .expect("Should respond");
    assert_eq!(rejected.status().as_u16(), 501);
}

#[rstest]
#[tokio::test]
async fn test_serves_fixture_files(protocol: MockUrlProtocol) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    tokio::fs::write(
        dir.path().join("health.yaml"),
        r#"
mocks:
  - method: GET
    url: http://api.example.com/health
    response:
      status: 200
      json: { ok: true }
"#,
    )
    .await
    .expect("Should write");
    let pattern = format!("{}/*.yaml", dir.path().display());
    protocol.load_fixtures(&pattern).await.expect("Should load");

    let server = MockServer::start(protocol).await.expect("Should start");
    let response = proxied_client(&server)
        .get("http://api.example.com/health")
        .send()
        .await
        .expect("Should respond");

    let body: Value = response.json().await.expect("Should be JSON");
    assert_eq!(body, json!({ "ok": true }));
}

#[rstest]
#[tokio::test]
async fn test_unknown_method_is_rejected(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol).await.expect("Should start");
    let method = reqwest::Method::from_bytes(b"PURGE").expect("valid method token");

    let response = direct_client()
        .request(method, server.url_for("/cache"))
        .send()
        .await
        .expect("Should respond");

    assert_eq!(response.status().as_u16(), 405);
}

#[rstest]
#[tokio::test]
async fn test_shutdown_stops_listening(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol).await.expect("Should start");
    let url = server.url_for("/");
    assert!(url.starts_with("http://127.0.0.1:"));

    server.shutdown().await.expect("Should shut down");

    let result = direct_client().get(url).send().await;
    assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn test_drop_stops_listening(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol).await.expect("Should start");
    let addr = server.addr();
    assert!(TcpStream::connect(addr).is_ok());

    drop(server);

    let refused = wait_for_condition(Duration::from_secs(5), || {
        TcpStream::connect(addr).is_err()
    })
    .await;
    assert!(refused);
}

#[rstest]
#[tokio::test]
async fn test_client_disconnect_cancels_response(protocol: MockUrlProtocol) {
    let server = MockServer::start(protocol.clone()).await.expect("Should start");
    let cancelled = Arc::new(AtomicBool::new(false));
    let inner = MockHttpResponder::with_chunks(
        200,
        HeaderMap::new(),
        vec![b'x'; 100],
        50,
        Duration::from_millis(50),
    )
    .expect("Should build responder");
    let responder = CancelRecordingResponder {
        inner,
        cancelled: cancelled.clone(),
    };
    let mock = MockHttpRequest::get(&server.url_for("/slow"))
        .expect("valid URL")
        .with_responder(Arc::new(responder));
    protocol.expect_mock_request(Arc::new(mock));

    let client = direct_client();
    let mut response = client
        .get(server.url_for("/slow"))
        .send()
        .await
        .expect("Should respond");
    assert_eq!(response.status().as_u16(), 200);
    let first = response.chunk().await.expect("Should read a chunk");
    assert!(first.is_some());
    assert!(!cancelled.load(Ordering::SeqCst));

    drop(response);
    drop(client);

    let was_cancelled = wait_for_condition(Duration::from_secs(5), || {
        cancelled.load(Ordering::SeqCst)
    })
    .await;
    assert!(was_cancelled);
}

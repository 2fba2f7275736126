//! End-to-end dispatcher behavior against a mock backend: classification,
//! caching, retry, auth refresh, and read fallbacks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use iyaya_client::IyayaClient;
use iyaya_client::http::{Connectivity, ManualConnectivity};
use iyaya_client::token::{IdentityProvider, MemoryTokenStorage, TokenManager};
use iyaya_config::{ClientConfig, RetryConfig};
use iyaya_core::{ErrorKind, Result};
use serde_json::json;
use wiremock::matchers::{bearer_token, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_config(base_url: &str) -> ClientConfig {
    ClientConfig::new()
        .with_base_url(base_url)
        .with_request_timeout(Duration::from_secs(2))
        .with_retry(RetryConfig {
            max_attempts: 2,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            jitter: false,
        })
}

fn signed_in_client(server: &MockServer, token: &str) -> IyayaClient {
    let tokens = TokenManager::new(
        Box::new(MemoryTokenStorage::with_token(token)),
        Box::new(NoRefreshProvider),
    );
    IyayaClient::with_parts(
        fast_config(&server.uri()),
        tokens,
        Box::new(ManualConnectivity::new(true)),
    )
    .unwrap()
}

struct NoRefreshProvider;

#[async_trait]
impl IdentityProvider for NoRefreshProvider {
    async fn fetch_token(&self, _force: bool) -> Result<Option<String>> {
        Ok(None)
    }
}

struct CountingProvider {
    calls: Arc<AtomicU32>,
    token: Option<String>,
}

#[async_trait]
impl IdentityProvider for CountingProvider {
    async fn fetch_token(&self, _force: bool) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.token.clone())
    }
}

fn profile_body() -> serde_json::Value {
    json!({"data": {"id": "u1", "name": "Pat", "email": "pat@example.com"}})
}

#[tokio::test]
async fn health_round_trips_without_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = IyayaClient::new(fast_config(&server.uri())).unwrap();
    let body = client.health().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn not_found_is_a_validation_error_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "job not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, "tok");
    let err = client.jobs().get("nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.status(), Some(404));
    assert!(err.message().contains("job not found"));
}

#[tokio::test]
async fn server_errors_are_retried_until_exhaustion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/my"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "overloaded"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, "tok");
    let err = client.jobs().my_jobs().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn create_is_never_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .and(header_exists("X-Idempotency-Key"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, "tok");
    let job = iyaya_client::services::jobs::NewJob {
        title: "Evening sitter".into(),
        description: None,
        location: None,
        hourly_rate: Some(18.5),
    };
    let err = client.jobs().create(&job).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"jobs": [{"id": "j1", "title": "Weekend nanny"}], "total": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, "tok");
    let first = client.jobs().list(&[]).await.unwrap();
    let second = client.jobs().list(&[]).await.unwrap();
    assert_eq!(first.jobs.len(), 1);
    assert_eq!(second.jobs.len(), 1);
}

#[tokio::test]
async fn write_invalidates_matching_cache_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"jobs": [{"id": "j1", "title": "Weekend nanny"}], "total": 1}
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "j2", "title": "Evening sitter"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, "tok");
    client.jobs().list(&[]).await.unwrap();

    let job = iyaya_client::services::jobs::NewJob {
        title: "Evening sitter".into(),
        description: None,
        location: None,
        hourly_rate: None,
    };
    client.jobs().create(&job).await.unwrap();

    // The cached listing was dropped, so this read goes back to the server.
    client.jobs().list(&[]).await.unwrap();
}

#[tokio::test]
async fn expired_token_is_refreshed_and_the_call_replayed_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(bearer_token("stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(bearer_token("fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .expect(1)
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicU32::new(0));
    let tokens = TokenManager::new(
        Box::new(MemoryTokenStorage::with_token("stale")),
        Box::new(CountingProvider {
            calls: calls.clone(),
            token: Some("fresh".into()),
        }),
    );
    let client = IyayaClient::with_parts(
        fast_config(&server.uri()),
        tokens,
        Box::new(ManualConnectivity::new(true)),
    )
    .unwrap();

    let profile = client.auth().profile().await.unwrap();
    assert_eq!(profile.email, "pat@example.com");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_401s_converge_on_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(bearer_token("stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(bearer_token("fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicU32::new(0));
    let tokens = TokenManager::new(
        Box::new(MemoryTokenStorage::with_token("stale")),
        Box::new(CountingProvider {
            calls: calls.clone(),
            token: Some("fresh".into()),
        }),
    );
    let client = IyayaClient::with_parts(
        fast_config(&server.uri()),
        tokens,
        Box::new(ManualConnectivity::new(true)),
    )
    .unwrap();

    let mut handles = Vec::new();
    for _ in 0..5 {
        let client = client.clone();
        handles.push(tokio::spawn(
            async move { client.auth().profile().await },
        ));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn replay_that_still_fails_clears_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;

    let tokens = TokenManager::new(
        Box::new(MemoryTokenStorage::with_token("stale")),
        Box::new(CountingProvider {
            calls: Arc::new(AtomicU32::new(0)),
            token: Some("fresh".into()),
        }),
    );
    let client = IyayaClient::with_parts(
        fast_config(&server.uri()),
        tokens,
        Box::new(ManualConnectivity::new(true)),
    )
    .unwrap();

    let err = client.auth().profile().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(err.message().contains("sign in again"));
    assert!(!client.auth().is_signed_in());
}

#[tokio::test]
async fn missing_session_fails_before_any_network_call() {
    let server = MockServer::start().await;

    let client = IyayaClient::new(fast_config(&server.uri())).unwrap();
    let err = client.auth().profile().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn offline_fails_fast_with_a_network_error() {
    let server = MockServer::start().await;

    let client = IyayaClient::with_parts(
        fast_config(&server.uri()),
        TokenManager::in_memory(),
        Box::new(ManualConnectivity::new(false)),
    )
    .unwrap();

    let err = client.health().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn connectivity_can_be_restored_at_runtime() {
    let probe = ManualConnectivity::new(false);
    assert!(!probe.is_online());
    probe.set_online(true);
    assert!(probe.is_online());
}

#[tokio::test]
async fn slow_response_surfaces_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = fast_config(&server.uri()).with_request_timeout(Duration::from_millis(100));
    let client = IyayaClient::new(config).unwrap();
    let err = client.health().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn truncated_success_body_is_a_transport_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    // A raw socket that advertises a longer body than it sends, then hangs
    // up mid-response.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"st",
                )
                .await;
        }
    });

    let client = IyayaClient::new(fast_config(&format!("http://{addr}"))).unwrap();
    let err = client.health().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn failed_booking_read_falls_back_to_an_empty_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/my"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = signed_in_client(&server, "tok");
    let page = client.bookings().my_bookings().await.unwrap();
    assert!(page.bookings.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 10);
}

#[tokio::test]
async fn double_wrapped_booking_envelope_normalizes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"data": {
                "bookings": [
                    {"id": "b1", "status": "confirmed"},
                    {"id": "b2", "status": "pending"}
                ],
                "total": 2, "page": 1, "limit": 10
            }}
        })))
        .mount(&server)
        .await;

    let client = signed_in_client(&server, "tok");
    let page = client.bookings().my_bookings().await.unwrap();
    assert_eq!(page.bookings.len(), 2);
    assert_eq!(page.total, 2);
    assert_eq!(page.bookings[0].id, "b1");
}

#[tokio::test]
async fn login_stores_the_token_and_enables_authed_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "token": "issued-token",
                "user": {"id": "u1", "name": "Pat", "email": "pat@example.com"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = IyayaClient::new(fast_config(&server.uri())).unwrap();
    assert!(!client.auth().is_signed_in());

    let session = client.auth().login("pat@example.com", "secret").await.unwrap();
    assert_eq!(session.token, "issued-token");
    assert!(client.auth().is_signed_in());

    client.auth().logout().await.unwrap();
    assert!(!client.auth().is_signed_in());
}

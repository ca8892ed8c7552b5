use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode as HttpStatus};
use axum::routing::{get, post};
use axum::Router;
use futures_util::future::join_all;
use serde_json::{Value, json};

use crate::session::store::CredentialStore;
use crate::session::types::{Session, User};

// =============================================================================
// STUB API
// =============================================================================

/// What the stub refresh endpoint should do.
enum RefreshMode {
    /// Issue this token and start accepting it on data endpoints.
    Issue(&'static str),
    /// Reject every renewal attempt.
    Fail,
}

struct Stub {
    valid_token: std::sync::Mutex<String>,
    refresh_mode: RefreshMode,
    refresh_delay: Duration,
    refresh_calls: AtomicUsize,
    data_calls: AtomicUsize,
}

impl Stub {
    fn new(valid_token: &str, refresh_mode: RefreshMode) -> Arc<Self> {
        Arc::new(Self {
            valid_token: std::sync::Mutex::new(valid_token.to_owned()),
            refresh_mode,
            refresh_delay: Duration::ZERO,
            refresh_calls: AtomicUsize::new(0),
            data_calls: AtomicUsize::new(0),
        })
    }

    fn with_refresh_delay(valid_token: &str, refresh_mode: RefreshMode, delay: Duration) -> Arc<Self> {
        let mut stub = Self::new(valid_token, refresh_mode);
        Arc::get_mut(&mut stub).unwrap().refresh_delay = delay;
        stub
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }
}

async fn blogs(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> (HttpStatus, Json<Value>) {
    stub.data_calls.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {}", stub.valid_token.lock().unwrap());
    let presented = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    if presented == Some(expected.as_str()) {
        (HttpStatus::OK, Json(json!([])))
    } else {
        (
            HttpStatus::UNAUTHORIZED,
            Json(json!({ "message": "unauthorized" })),
        )
    }
}

async fn echo_auth(State(_): State<Arc<Stub>>, headers: HeaderMap) -> Json<Value> {
    let presented = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());
    Json(json!({ "authorization": presented }))
}

async fn broken(State(_): State<Arc<Stub>>) -> (HttpStatus, Json<Value>) {
    (
        HttpStatus::SERVICE_UNAVAILABLE,
        Json(json!({ "message": "maintenance window" })),
    )
}

async fn refresh(State(stub): State<Arc<Stub>>) -> (HttpStatus, Json<Value>) {
    stub.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(stub.refresh_delay).await;
    match &stub.refresh_mode {
        RefreshMode::Issue(token) => {
            *stub.valid_token.lock().unwrap() = (*token).to_owned();
            (HttpStatus::OK, Json(json!({ "accessToken": token })))
        }
        RefreshMode::Fail => (
            HttpStatus::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "refresh denied" })),
        ),
    }
}

async fn serve(stub: Arc<Stub>) -> String {
    let app = Router::new()
        .route("/api/blogs", get(blogs))
        .route("/api/echo-auth", get(echo_auth))
        .route("/api/broken", get(broken))
        .route("/api/auth/refresh-token", post(refresh))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// =============================================================================
// CLIENT FIXTURES
// =============================================================================

fn session_with_token(access_token: &str) -> Session {
    Session {
        user: User {
            id: "u-1".into(),
            name: "Ada".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            profile_picture: None,
        },
        access_token: access_token.into(),
        refresh_token: "refresh-1".into(),
    }
}

fn client_with_state(base_url: &str, dir: &tempfile::TempDir, session: Option<Session>) -> ApiClient {
    let store = CredentialStore::new(dir.path().join("session.json"));
    if let Some(session) = &session {
        store.save(session).unwrap();
    }
    let auth = AuthState::init(store);
    let config = ClientConfig::new(base_url).with_timeout(Duration::from_secs(5));
    ApiClient::new(&config, auth).unwrap()
}

// =============================================================================
// NO-TOKEN IDEMPOTENCE
// =============================================================================

#[tokio::test]
async fn request_without_session_sends_no_authorization_header() {
    let stub = Stub::new("anything", RefreshMode::Fail);
    let base_url = serve(stub).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, None);

    let echoed: Value = api.get_json("/api/echo-auth").await.unwrap();
    assert!(echoed["authorization"].is_null());
}

#[tokio::test]
async fn request_with_session_sends_bearer_header() {
    let stub = Stub::new("anything", RefreshMode::Fail);
    let base_url = serve(stub).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("tok-1")));

    let echoed: Value = api.get_json("/api/echo-auth").await.unwrap();
    assert_eq!(echoed["authorization"], json!("Bearer tok-1"));
}

// =============================================================================
// HAPPY PATH
// =============================================================================

#[tokio::test]
async fn valid_token_passes_through_without_refresh() {
    let stub = Stub::new("good", RefreshMode::Fail);
    let base_url = serve(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("good")));

    let blogs: Value = api.get_json("/api/blogs").await.unwrap();
    assert!(blogs.as_array().unwrap().is_empty());
    assert_eq!(stub.refresh_calls(), 0);
    assert_eq!(stub.data_calls(), 1);
}

// =============================================================================
// SINGLE RETRY
// =============================================================================

#[tokio::test]
async fn expired_token_refreshes_and_replays_once() {
    let stub = Stub::new("fresh", RefreshMode::Issue("fresh"));
    let base_url = serve(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("stale")));

    let blogs: Value = api.get_json("/api/blogs").await.unwrap();
    assert!(blogs.as_array().unwrap().is_empty());
    assert_eq!(stub.refresh_calls(), 1);
    assert_eq!(stub.data_calls(), 2);
    assert_eq!(api.auth().access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn refresh_persists_new_token_and_keeps_identity() {
    let stub = Stub::new("fresh", RefreshMode::Issue("fresh"));
    let base_url = serve(stub).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("stale")));

    let _: Value = api.get_json("/api/blogs").await.unwrap();

    let persisted = CredentialStore::new(dir.path().join("session.json"))
        .load()
        .unwrap();
    assert_eq!(persisted.access_token, "fresh");
    assert_eq!(persisted.user.id, "u-1");
    assert_eq!(persisted.refresh_token, "refresh-1");
}

#[tokio::test]
async fn second_401_after_refresh_is_final_and_triggers_no_second_refresh() {
    // The refresh endpoint issues a token the data endpoint still rejects.
    let stub = Stub::new("unreachable", RefreshMode::Issue("still-stale"));
    let base_url = serve(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("stale")));

    let error = api.get_json::<Value>("/api/blogs").await.unwrap_err();
    assert!(error.is_unauthorized());
    assert_eq!(stub.refresh_calls(), 1);
    assert_eq!(stub.data_calls(), 2);
}

// =============================================================================
// SINGLE-FLIGHT REFRESH
// =============================================================================

#[tokio::test]
async fn concurrent_401s_share_one_refresh_call() {
    let stub =
        Stub::with_refresh_delay("fresh", RefreshMode::Issue("fresh"), Duration::from_millis(100));
    let base_url = serve(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("stale")));

    let requests = (0..8).map(|_| {
        let api = api.clone();
        async move { api.get_json::<Value>("/api/blogs").await }
    });
    let results = join_all(requests).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(stub.refresh_calls(), 1);
    assert_eq!(api.auth().access_token().as_deref(), Some("fresh"));
}

#[tokio::test]
async fn concurrent_refresh_failures_share_one_refresh_call() {
    let stub = Stub::with_refresh_delay("unreachable", RefreshMode::Fail, Duration::from_millis(100));
    let base_url = serve(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("stale")));

    let requests = (0..4).map(|_| {
        let api = api.clone();
        async move { api.get_json::<Value>("/api/blogs").await }
    });
    let results = join_all(requests).await;

    assert!(results
        .iter()
        .all(|result| matches!(result, Err(Error::SessionExpired))));
    assert_eq!(stub.refresh_calls(), 1);
}

// =============================================================================
// REFRESH-FAILURE TEARDOWN
// =============================================================================

#[tokio::test]
async fn refresh_failure_clears_store_and_projection() {
    let stub = Stub::new("unreachable", RefreshMode::Fail);
    let base_url = serve(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("stale")));

    let error = api.get_json::<Value>("/api/blogs").await.unwrap_err();
    assert!(matches!(error, Error::SessionExpired));
    assert!(!api.auth().is_authenticated());
    assert!(CredentialStore::new(dir.path().join("session.json")).load().is_none());
    assert_eq!(stub.refresh_calls(), 1);
}

#[tokio::test]
async fn unauthenticated_401_becomes_session_expired() {
    let stub = Stub::new("unreachable", RefreshMode::Fail);
    let base_url = serve(stub).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, None);

    let error = api.get_json::<Value>("/api/blogs").await.unwrap_err();
    assert!(matches!(error, Error::SessionExpired));
    assert!(!api.auth().is_authenticated());
}

// =============================================================================
// NON-401 PASSTHROUGH
// =============================================================================

#[tokio::test]
async fn non_401_failures_pass_through_untouched() {
    let stub = Stub::new("good", RefreshMode::Fail);
    let base_url = serve(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let api = client_with_state(&base_url, &dir, Some(session_with_token("good")));

    let error = api.get_json::<Value>("/api/broken").await.unwrap_err();
    match error {
        Error::Api { status, message, .. } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(stub.refresh_calls(), 0);
}

// =============================================================================
// api_error_message
// =============================================================================

#[test]
fn api_error_message_extracts_json_envelope() {
    assert_eq!(api_error_message(r#"{"message":"nope"}"#), "nope");
}

#[test]
fn api_error_message_falls_back_to_raw_body() {
    assert_eq!(api_error_message("gateway exploded"), "gateway exploded");
}

#[test]
fn api_error_message_handles_empty_body() {
    assert_eq!(api_error_message(""), "no error details provided");
}

#[test]
fn api_error_message_ignores_non_string_message() {
    assert_eq!(api_error_message(r#"{"message":42}"#), r#"{"message":42}"#);
}

//! Refresh protocol tests against an in-process HTTP server.
//!
//! The server counts refresh calls so the tests can assert the single-flight
//! property directly: any number of concurrent 401s must produce exactly one
//! call to the refresh endpoint.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use sisclient::client::HttpClient;
use sisclient::storage::TokenStore;
use sisclient::{ApiConfig, ApiError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const FRESH_TOKEN: &str = "fresh-token";

/// How the test server's refresh endpoint behaves.
#[derive(Clone, Copy)]
enum RefreshBehavior {
    /// Issue a token the protected route accepts, after a short delay so
    /// concurrent requests pile up behind the in-flight refresh.
    Succeed,
    /// Reject the refresh token.
    Fail,
    /// Issue a token the protected route still rejects.
    IssueStale,
}

struct ServerState {
    refresh_calls: AtomicUsize,
    behavior: RefreshBehavior,
}

async fn refresh(State(state): State<Arc<ServerState>>) -> (StatusCode, Json<Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    match state.behavior {
        RefreshBehavior::Succeed => {
            tokio::time::sleep(Duration::from_millis(100)).await;
            (StatusCode::OK, Json(json!({ "access": FRESH_TOKEN })))
        }
        RefreshBehavior::Fail => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Refresh token expired" })),
        ),
        RefreshBehavior::IssueStale => {
            (StatusCode::OK, Json(json!({ "access": "still-stale" })))
        }
    }
}

async fn protected(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {FRESH_TOKEN}"));
    if authorized {
        (StatusCode::OK, Json(json!({ "ok": true })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Token invalid" })),
        )
    }
}

async fn forbidden() -> (StatusCode, Json<Value>) {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "detail": "Admins only" })),
    )
}

async fn invalid() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "field": "is required" })),
    )
}

/// Starts the server and returns its state and base URL.
async fn spawn_server(behavior: RefreshBehavior) -> (Arc<ServerState>, String) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let state = Arc::new(ServerState {
        refresh_calls: AtomicUsize::new(0),
        behavior,
    });
    let app = Router::new()
        .route("/api/token/refresh/", post(refresh))
        .route("/api/protected/", get(protected))
        .route("/api/forbidden/", get(forbidden))
        .route("/api/invalid/", get(invalid))
        .with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (state, format!("http://{addr}/api/"))
}

fn client_with_tokens(base_url: &str) -> (HttpClient, Arc<TokenStore>) {
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set_tokens("stale-token", "refresh-ok");
    let client = HttpClient::new(&ApiConfig::real(base_url), Arc::clone(&tokens)).unwrap();
    (client, tokens)
}

#[tokio::test]
async fn concurrent_401s_share_a_single_refresh() {
    let (state, base_url) = spawn_server(RefreshBehavior::Succeed).await;
    let (client, tokens) = client_with_tokens(&base_url);

    let requests = (0..5).map(|_| client.get::<Value>("protected/"));
    let results = futures::future::join_all(requests).await;

    for result in results {
        assert_eq!(result.unwrap()["ok"], true);
    }
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.access_token().as_deref(), Some(FRESH_TOKEN));
}

#[tokio::test]
async fn failed_refresh_rejects_all_and_forces_logout() {
    let (state, base_url) = spawn_server(RefreshBehavior::Fail).await;
    let (client, tokens) = client_with_tokens(&base_url);

    let logged_out = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&logged_out);
    client.set_forced_logout_handler(move || flag.store(true, Ordering::SeqCst));

    let requests = (0..3).map(|_| client.get::<Value>("protected/"));
    let results = futures::future::join_all(requests).await;

    for result in results {
        let err = result.unwrap_err();
        assert!(
            matches!(err, ApiError::Unauthorized { .. }),
            "expected unauthorized, got {err}"
        );
    }
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(logged_out.load(Ordering::SeqCst));
    assert!(tokens.access_token().is_none());
    assert!(tokens.refresh_token().is_none());
}

#[tokio::test]
async fn request_is_retried_at_most_once() {
    let (state, base_url) = spawn_server(RefreshBehavior::IssueStale).await;
    let (client, _tokens) = client_with_tokens(&base_url);

    // The refresh succeeds but the new token is still rejected; the request
    // must fail rather than refresh again.
    let err = client.get::<Value>("protected/").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn forbidden_is_terminal_and_never_refreshes() {
    let (state, base_url) = spawn_server(RefreshBehavior::Succeed).await;
    let (client, _tokens) = client_with_tokens(&base_url);

    let err = client.get::<Value>("forbidden/").await.unwrap_err();
    assert_eq!(err.to_string(), "Admins only");
    assert!(matches!(err, ApiError::PermissionDenied { .. }));
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn validation_errors_join_field_messages() {
    let (_state, base_url) = spawn_server(RefreshBehavior::Succeed).await;
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set_tokens(FRESH_TOKEN, "refresh-ok");
    let client = HttpClient::new(&ApiConfig::real(base_url.as_str()), tokens).unwrap();

    let err = client.get::<Value>("invalid/").await.unwrap_err();
    assert_eq!(err.to_string(), "field: is required");
    assert!(matches!(err, ApiError::Validation { .. }));
}

#[tokio::test]
async fn missing_refresh_token_fails_without_a_network_call() {
    let (state, base_url) = spawn_server(RefreshBehavior::Succeed).await;
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set_access_token("stale-token");
    let client = HttpClient::new(&ApiConfig::real(base_url.as_str()), tokens).unwrap();

    let err = client.get::<Value>("protected/").await.unwrap_err();
    assert!(matches!(err, ApiError::MissingRefreshToken));
    assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 0);
}

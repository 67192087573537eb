use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::put,
    Json, Router,
};
use serde_json::json;
use shared::error::{DEFAULT_REJECTION_MESSAGE, NETWORK_FAILURE_MESSAGE};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct StubState {
    received: Arc<Mutex<Vec<(LinkKind, String)>>>,
}

async fn record(state: &StubState, kind: LinkKind, request: ValidateLinkRequest) -> String {
    state.received.lock().await.push((kind, request.url.clone()));
    request.url
}

// Stub rules: "good" links pass, "quiet" links fail without a message,
// "garbled" links fail with a non-JSON body, everything else fails with a message.
fn respond(url: &str) -> Response {
    if url.contains("good") {
        StatusCode::OK.into_response()
    } else if url.contains("quiet") {
        (StatusCode::BAD_REQUEST, Json(json!({}))).into_response()
    } else if url.contains("garbled") {
        (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "지원하지 않는 링크예요." })),
        )
            .into_response()
    }
}

async fn handle_bookmark(
    State(state): State<StubState>,
    Json(request): Json<ValidateLinkRequest>,
) -> Response {
    let url = record(&state, LinkKind::Bookmark, request).await;
    respond(&url)
}

async fn handle_store(
    State(state): State<StubState>,
    Json(request): Json<ValidateLinkRequest>,
) -> Response {
    let url = record(&state, LinkKind::Store, request).await;
    respond(&url)
}

async fn spawn_validation_server() -> (String, StubState) {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/v1/pings/bookmark", put(handle_bookmark))
        .route("/api/v1/pings/store", put(handle_store))
        .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api/v1"), state)
}

fn validator_for(base_url: &str) -> HttpLinkValidator {
    HttpLinkValidator::new(ApiEndpoints::new(base_url).expect("endpoints"))
}

#[test]
fn endpoints_keep_base_path() {
    let endpoints = ApiEndpoints::new("https://api.example.com/api/v1/").expect("endpoints");

    assert_eq!(
        endpoints.validation_url(LinkKind::Bookmark).as_str(),
        "https://api.example.com/api/v1/pings/bookmark"
    );
    assert_eq!(
        endpoints.validation_url(LinkKind::Store).as_str(),
        "https://api.example.com/api/v1/pings/store"
    );
    assert_eq!(
        endpoints.submit_url().as_str(),
        "https://api.example.com/api/v1/nonmembers/pings"
    );
}

#[test]
fn endpoints_accept_base_without_path() {
    let endpoints = ApiEndpoints::new(" http://localhost:8081 ").expect("endpoints");

    assert_eq!(endpoints.base().as_str(), "http://localhost:8081/");
    assert_eq!(
        endpoints.validation_url(LinkKind::Store).as_str(),
        "http://localhost:8081/pings/store"
    );
}

#[test]
fn endpoints_reject_bad_base_urls() {
    assert!(matches!(
        ApiEndpoints::new("not a url"),
        Err(EndpointError::InvalidUrl { .. })
    ));
    assert!(matches!(
        ApiEndpoints::new("ftp://files.example.com"),
        Err(EndpointError::UnsupportedScheme(_))
    ));
}

#[test]
fn endpoints_reject_query_or_fragment_in_base() {
    assert!(matches!(
        ApiEndpoints::new("http://h/api?x=1"),
        Err(EndpointError::UnexpectedQuery(_))
    ));
    assert!(matches!(
        ApiEndpoints::new("http://h/api#top"),
        Err(EndpointError::UnexpectedQuery(_))
    ));
}

#[test]
fn endpoints_append_slash_to_path_base() {
    let endpoints = ApiEndpoints::new("http://h/api/v1").expect("endpoints");

    assert_eq!(endpoints.base().as_str(), "http://h/api/v1/");
    assert_eq!(
        endpoints.validation_url(LinkKind::Bookmark).as_str(),
        "http://h/api/v1/pings/bookmark"
    );
}

#[tokio::test]
async fn accepted_link_validates() {
    let (base_url, state) = spawn_validation_server().await;
    let validator = validator_for(&base_url);

    let result = validator
        .validate(LinkKind::Bookmark, "https://good.link")
        .await;

    assert_eq!(result, Ok(()));
    assert_eq!(
        *state.received.lock().await,
        vec![(LinkKind::Bookmark, "https://good.link".to_string())]
    );
}

#[tokio::test]
async fn each_kind_uses_its_own_route() {
    let (base_url, state) = spawn_validation_server().await;
    let validator = validator_for(&base_url);

    validator.validate(LinkKind::Store, "https://good.store").await.expect("store");
    validator
        .validate(LinkKind::Bookmark, "https://good.map")
        .await
        .expect("bookmark");

    assert_eq!(
        *state.received.lock().await,
        vec![
            (LinkKind::Store, "https://good.store".to_string()),
            (LinkKind::Bookmark, "https://good.map".to_string()),
        ]
    );
}

#[tokio::test]
async fn rejection_carries_server_message() {
    let (base_url, _) = spawn_validation_server().await;
    let validator = validator_for(&base_url);

    let result = validator.validate(LinkKind::Store, "bad").await;

    assert_eq!(
        result,
        Err(ValidationFailure::Rejected {
            message: "지원하지 않는 링크예요.".to_string()
        })
    );
}

#[tokio::test]
async fn rejection_without_message_uses_default() {
    let (base_url, _) = spawn_validation_server().await;
    let validator = validator_for(&base_url);

    let result = validator.validate(LinkKind::Store, "quiet").await;

    assert_eq!(
        result,
        Err(ValidationFailure::Rejected {
            message: DEFAULT_REJECTION_MESSAGE.to_string()
        })
    );
}

#[tokio::test]
async fn rejection_with_unreadable_body_uses_default() {
    let (base_url, _) = spawn_validation_server().await;
    let validator = validator_for(&base_url);

    let result = validator.validate(LinkKind::Bookmark, "garbled").await;

    assert_eq!(
        result.map_err(|failure| failure.message().to_string()),
        Err(DEFAULT_REJECTION_MESSAGE.to_string())
    );
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let validator = validator_for(&format!("http://{addr}"));

    let result = validator.validate(LinkKind::Bookmark, "https://good.link").await;

    assert_eq!(
        result,
        Err(ValidationFailure::Network {
            message: NETWORK_FAILURE_MESSAGE.to_string()
        })
    );
}

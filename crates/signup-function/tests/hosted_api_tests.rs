//! Signup API against a mock hosted backend.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use backend_client::BackendClient;
use serde_json::{json, Value};
use signup_function::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    HostedDirectory,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, body_partial_json, header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROFILES_PATH: &str = "/rest/v1/profiles";
const GENERATE_EMAIL_PATH: &str = "/rest/v1/rpc/generate_unique_email";
const CREATE_USER_PATH: &str = "/auth/v1/admin/users";

/// Create a test app whose directory talks to `mock_server`.
fn create_test_app(mock_server: &MockServer) -> Router {
    let client =
        BackendClient::new(mock_server.uri(), "service-key", Duration::from_secs(5)).unwrap();
    create_router_with_rate_limit(
        AppState::new(Arc::new(HostedDirectory::new(client))),
        RateLimitState::permissive(),
    )
}

fn signup_request() -> Request<Body> {
    let body = json!({
        "username": "alice",
        "phoneNumber": "+8613800000000",
        "password": "secret1",
        "fundPassword": "654321",
        "invitationCode": "VIP8"
    });

    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn mount_profiles(mock_server: &MockServer, rows: Value) {
    Mock::given(method("GET"))
        .and(path(PROFILES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(mock_server)
        .await;
}

async fn mount_generated_email(mock_server: &MockServer, email: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_EMAIL_PATH))
        .and(body_json(json!({ "p_username": "alice" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(email)))
        .mount(mock_server)
        .await;
}

async fn expect_no_user_created(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(CREATE_USER_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_signup_success_creates_confirmed_user() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server, json!([])).await;
    mount_generated_email(&mock_server, "alice.3f9a0c1e@vip.internal").await;

    Mock::given(method("POST"))
        .and(path(CREATE_USER_PATH))
        .and(header_eq("apikey", "service-key"))
        .and(body_partial_json(json!({
            "email": "alice.3f9a0c1e@vip.internal",
            "password": "secret1",
            "email_confirm": true,
            "user_metadata": {
                "username": "alice",
                "phone_number": "+8613800000000",
                "fund_password": "654321",
                "invitation_code": "VIP8"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "7d8e4c2a-0000-4000-8000-000000000001",
            "email": "alice.3f9a0c1e@vip.internal",
            "email_confirmed_at": "2026-10-15T08:00:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["user_id"], "7d8e4c2a-0000-4000-8000-000000000001");
    assert_eq!(json["email_confirmed"], true);
    assert!(!json.to_string().contains("vip.internal"));
}

#[tokio::test]
async fn test_unconfirmed_user_reported() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server, json!([])).await;
    mount_generated_email(&mock_server, "alice.3f9a0c1e@vip.internal").await;

    Mock::given(method("POST"))
        .and(path(CREATE_USER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-2",
            "email_confirmed_at": null
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["email_confirmed"], false);
}

#[tokio::test]
async fn test_duplicate_username_from_profiles() {
    let mock_server = MockServer::start().await;
    mount_profiles(
        &mock_server,
        json!([{ "id": "u-1", "username": "alice", "phone_number": "+8613800000000" }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_EMAIL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("unused@vip.internal")))
        .expect(0)
        .mount(&mock_server)
        .await;
    expect_no_user_created(&mock_server).await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "Username already exists");
    assert_eq!(json["code"], "DUPLICATE_IDENTITY");
}

#[tokio::test]
async fn test_duplicate_phone_from_profiles() {
    let mock_server = MockServer::start().await;
    mount_profiles(
        &mock_server,
        json!([{ "id": "u-9", "username": "carol", "phone_number": "+8613800000000" }]),
    )
    .await;
    expect_no_user_created(&mock_server).await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"],
        "Phone number already exists"
    );
}

#[tokio::test]
async fn test_email_rpc_failure() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server, json!([])).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_EMAIL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("function failed"))
        .mount(&mock_server)
        .await;
    expect_no_user_created(&mock_server).await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["code"],
        "EMAIL_GENERATION_FAILED"
    );
}

#[tokio::test]
async fn test_empty_generated_email_rejected() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server, json!([])).await;
    mount_generated_email(&mock_server, "  ").await;
    expect_no_user_created(&mock_server).await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["code"],
        "EMAIL_GENERATION_FAILED"
    );
}

#[tokio::test]
async fn test_auth_rejection_message_propagated() {
    let mock_server = MockServer::start().await;
    mount_profiles(&mock_server, json!([])).await;
    mount_generated_email(&mock_server, "alice.3f9a0c1e@vip.internal").await;

    Mock::given(method("POST"))
        .and(path(CREATE_USER_PATH))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "code": 422,
            "msg": "Password should be at least 6 characters"
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["error"], "Password should be at least 6 characters");
    assert_eq!(json["code"], "AUTH_CREATION_FAILED");
}

#[tokio::test]
async fn test_profiles_outage_is_backend_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(PROFILES_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("database unavailable"))
        .mount(&mock_server)
        .await;
    expect_no_user_created(&mock_server).await;

    let app = create_test_app(&mock_server);
    let response = app.oneshot(signup_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["code"], "BACKEND_ERROR");
}

#[tokio::test]
async fn test_health_reports_backend_reachability() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["directory"], "backend");
    assert_eq!(json["directory_healthy"], true);
}

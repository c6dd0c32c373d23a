//! Registration flow against a mock signup function.

mod common;

use backend_client::IdentityField;
use chrono::{TimeZone, Utc};
use common::{mock_backend, test_portal};
use portal_core::{PortalError, RegistrationRequest, RegistrationState};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn alice() -> RegistrationRequest {
    RegistrationRequest::new("alice", "+8613800000000", "secret1", "654321")
        .with_invitation_code("VIP8")
}

#[tokio::test]
async fn test_register_success_hides_internal_email() {
    let backend = mock_backend().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/register-user"))
        .and(header("apikey", "anon-key"))
        .and(body_partial_json(serde_json::json!({
            "username": "alice",
            "phoneNumber": "+8613800000000",
            "fundPassword": "654321",
            "invitationCode": "VIP8"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "user_id": "b7a0c1",
            "message": "User registered successfully"
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let portal = test_portal(&backend, Duration::from_secs(5));
    let flow = portal.registration_flow();

    let result = assert_ok!(flow.register_user(&alice()).await);

    assert!(result.success);
    assert_eq!(result.user_id, "b7a0c1");
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("email").is_none());
    assert!(matches!(flow.state(), RegistrationState::Success(_)));
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let backend = mock_backend().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/register-user"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Username already exists",
            "code": "DUPLICATE_IDENTITY"
        })))
        .mount(&backend)
        .await;

    let portal = test_portal(&backend, Duration::from_secs(5));
    let flow = portal.registration_flow();

    let err = flow.register_user(&alice()).await.unwrap_err();

    assert_eq!(
        err,
        PortalError::DuplicateIdentity {
            field: IdentityField::Username
        }
    );
    assert_eq!(
        flow.state(),
        RegistrationState::Error("Username already exists".into())
    );

    flow.reset();
    assert_eq!(flow.state(), RegistrationState::Idle);
}

#[tokio::test]
async fn test_register_auth_failure_carries_backend_message() {
    let backend = mock_backend().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/register-user"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Password should be at least 6 characters",
            "code": "AUTH_CREATION_FAILED"
        })))
        .mount(&backend)
        .await;

    let portal = test_portal(&backend, Duration::from_secs(5));
    let flow = portal.registration_flow();

    let err = flow.register_user(&alice()).await.unwrap_err();

    assert_eq!(
        err,
        PortalError::AuthCreationFailed("Password should be at least 6 characters".into())
    );
}

#[tokio::test]
async fn test_register_backend_outage_shows_connectivity_message() {
    let backend = mock_backend().await;

    Mock::given(method("POST"))
        .and(path("/functions/v1/register-user"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": "Backend error: error sending request for url (http://db/rest/v1/profiles)",
            "code": "BACKEND_ERROR"
        })))
        .mount(&backend)
        .await;

    let portal = test_portal(&backend, Duration::from_secs(5));
    let flow = portal.registration_flow();

    let err = flow.register_user(&alice()).await.unwrap_err();

    assert!(matches!(err, PortalError::BackendUnavailable(_)));
    match flow.state() {
        RegistrationState::Error(message) => {
            assert!(!message.contains("error sending request"));
            assert_eq!(message, err.user_message());
        }
        other => panic!("unexpected state: {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_email() {
    let backend = mock_backend().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/generate_unique_email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("alice.3f9a0c1e@vip.internal")))
        .mount(&backend)
        .await;

    let portal = test_portal(&backend, Duration::from_secs(5));
    let flow = portal.registration_flow();

    let email = assert_ok!(flow.generate_email("alice").await);
    assert_eq!(email, "alice.3f9a0c1e@vip.internal");
}

#[tokio::test]
async fn test_generate_email_failure() {
    let backend = mock_backend().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/rpc/generate_unique_email"))
        .respond_with(ResponseTemplate::new(500).set_body_string("function failed"))
        .mount(&backend)
        .await;

    let portal = test_portal(&backend, Duration::from_secs(5));
    let flow = portal.registration_flow();

    assert!(matches!(
        flow.generate_email("alice").await,
        Err(PortalError::EmailGenerationFailed(_))
    ));
}

#[tokio::test]
async fn test_commission_summary() {
    let backend = mock_backend().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/commissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "order_id": "o-2", "amount": "2.50", "created_at": "2026-10-15T01:00:00Z" },
            { "order_id": "o-1", "amount": "1.00", "created_at": "2026-10-14T01:00:00Z" }
        ])))
        .mount(&backend)
        .await;

    let portal = test_portal(&backend, Duration::from_secs(5));
    let now = Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap();

    let summary = portal.commission_summary("user-1", now).await.unwrap();

    assert_eq!(summary.today, Decimal::new(250, 2));
    assert_eq!(summary.yesterday, Decimal::new(100, 2));
    assert_eq!(summary.total, Decimal::new(350, 2));
}

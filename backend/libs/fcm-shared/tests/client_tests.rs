/// HTTP-level tests for the FCM client
///
/// The Google token endpoint and the FCM send endpoint are both served by
/// a local wiremock server.
use fcm_shared::{FCMClient, FCMError, PushNotification, ServiceAccountKey};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");

fn client_for(server: &MockServer) -> FCMClient {
    let credentials = ServiceAccountKey {
        project_id: Some("demo-project".to_string()),
        private_key_id: None,
        private_key: PRIVATE_KEY.to_string(),
        client_email: "push@demo-project.iam.gserviceaccount.com".to_string(),
        client_id: None,
        auth_uri: None,
        token_uri: format!("{}/token", server.uri()),
    };

    FCMClient::new("demo-project".to_string(), credentials).with_api_base(server.uri())
}

fn notification() -> PushNotification {
    let mut data = HashMap::new();
    data.insert("kind".to_string(), "alert".to_string());
    PushNotification {
        title: "Storm warning".to_string(),
        body: "Strong winds expected tonight".to_string(),
        data,
    }
}

#[tokio::test]
async fn test_fetch_access_token_exchanges_assertion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("jwt-bearer"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server).fetch_access_token().await.unwrap();

    assert_eq!(token.access_token, "ya29.test-token");
    assert_eq!(token.expires_in, Some(3599));
}

#[tokio::test]
async fn test_fetch_access_token_rejected_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_access_token().await.unwrap_err();

    match err {
        FCMError::TokenRequestFailed { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_access_token_without_token_field_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_access_token().await.unwrap_err();
    assert!(matches!(err, FCMError::TokenRequestFailed { status: 200, .. }));
}

#[tokio::test]
async fn test_send_delivers_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/messages:send"))
        .and(header("authorization", "Bearer ya29.test-token"))
        .and(body_partial_json(json!({
            "message": {
                "token": "device-token-1",
                "notification": { "title": "Storm warning" },
                "data": { "kind": "alert" },
                "android": { "priority": "high" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo-project/messages/0:1234"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .send("ya29.test-token", "device-token-1", &notification())
        .await
        .unwrap();

    assert_eq!(
        result.message_id.as_deref(),
        Some("projects/demo-project/messages/0:1234")
    );
}

#[tokio::test]
async fn test_send_returns_provider_error_body() {
    let server = MockServer::start().await;
    let error_body = json!({
        "error": {
            "code": 404,
            "message": "Requested entity was not found.",
            "status": "NOT_FOUND"
        }
    });
    Mock::given(method("POST"))
        .and(path("/v1/projects/demo-project/messages:send"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body.clone()))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .send("ya29.test-token", "stale-token", &notification())
        .await
        .unwrap_err();

    match err {
        FCMError::ApiError { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, error_body);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

use anyhow::Result;
use httpmock::prelude::*;
use school_admin::adapters::credential::SecretString;
use school_admin::{
    build_privileged_client, PasswordPolicy, PrivilegedClient, ProvisioningHandler,
    ProvisioningService, RequestValidator,
};
use serde_json::{json, Value};
use std::time::Duration;

const SERVICE_KEY: &str = "service-role-test-key-7f3a";

fn handler_for(server: &MockServer, timeout: Duration) -> ProvisioningHandler<PrivilegedClient> {
    let client = build_privileged_client(
        &server.base_url(),
        Some(SecretString::from(SERVICE_KEY)),
        timeout,
    )
    .unwrap();
    let service = ProvisioningService::new(
        client,
        RequestValidator::new(PasswordPolicy::default()),
        timeout,
    );
    ProvisioningHandler::new(service, "*")
}

fn demo_body() -> String {
    json!({ "email": "demo@example.com", "password": "Passw0rd!", "role": "teacher" }).to_string()
}

/// 完整流程：驗證 -> 呼叫 admin API -> 200 { user }
#[tokio::test]
async fn test_demo_teacher_is_provisioned() -> Result<()> {
    let server = MockServer::start_async().await;
    let bearer = format!("Bearer {}", SERVICE_KEY);
    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/v1/admin/users")
                .header("apikey", SERVICE_KEY)
                .header("authorization", bearer.as_str())
                .json_body(json!({
                    "email": "demo@example.com",
                    "password": "Passw0rd!",
                    "email_confirm": true,
                    "user_metadata": { "role": "teacher" }
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "id": "2b1c56f0-1f7e-4a4e-9a51-6c1f2f0f9e11",
                    "aud": "authenticated",
                    "role": "authenticated",
                    "email": "demo@example.com",
                    "email_confirmed_at": "2026-10-19T08:30:00.000000Z",
                    "app_metadata": { "provider": "email", "providers": ["email"] },
                    "user_metadata": { "role": "teacher" },
                    "identities": [],
                    "created_at": "2026-10-19T08:30:00.000000Z"
                }));
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    let response = handler.handle("POST", Some(&demo_body())).await;

    create_mock.assert_async().await;
    assert_eq!(response.status, 200);
    assert_eq!(
        response.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );

    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body["user"]["id"], json!("2b1c56f0-1f7e-4a4e-9a51-6c1f2f0f9e11"));
    assert_eq!(body["user"]["email"], json!("demo@example.com"));
    assert_eq!(body["user"]["metadata"], json!({ "role": "teacher" }));
    assert_eq!(body["user"]["role"], json!("teacher"));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_is_passed_through_as_400() -> Result<()> {
    let server = MockServer::start_async().await;
    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(422).json_body(json!({
                "code": 422,
                "error_code": "email_exists",
                "msg": "A user with this email address has already been registered"
            }));
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    let response = handler.handle("POST", Some(&demo_body())).await;

    assert_eq!(create_mock.hits_async().await, 1);
    assert_eq!(response.status, 400);
    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(
        body,
        json!({ "error": "A user with this email address has already been registered" })
    );
    Ok(())
}

#[tokio::test]
async fn test_timeout_returns_500_without_leaking_key() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({ "id": "late", "email": "demo@example.com" }));
        })
        .await;

    let handler = handler_for(&server, Duration::from_millis(300));
    let response = handler.handle("POST", Some(&demo_body())).await;

    assert_eq!(response.status, 500);
    assert!(!response.body.contains(SERVICE_KEY));
    assert!(response.headers.values().all(|v| !v.contains(SERVICE_KEY)));
    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body, json!({ "error": "Failed to create user" }));
    Ok(())
}

#[tokio::test]
async fn test_server_fault_is_transport_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(503).body("upstream connect error");
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    let response = handler.handle("POST", Some(&demo_body())).await;

    assert_eq!(response.status, 500);
    assert!(!response.body.contains("upstream"));
    Ok(())
}

#[tokio::test]
async fn test_malformed_success_body_is_transport_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    let response = handler.handle("POST", Some(&demo_body())).await;

    assert_eq!(response.status, 500);
    Ok(())
}

#[tokio::test]
async fn test_invalid_request_makes_no_privileged_call() -> Result<()> {
    let server = MockServer::start_async().await;
    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(200).json_body(json!({ "id": "x" }));
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    for body in [
        json!({ "password": "Passw0rd!" }),
        json!({ "email": "demo@example.com" }),
        json!({ "email": "no-at-sign", "password": "Passw0rd!" }),
    ] {
        let response = handler.handle("POST", Some(&body.to_string())).await;
        assert_eq!(response.status, 400);
        let body: Value = serde_json::from_str(&response.body)?;
        assert!(body["error"].is_string());
    }

    assert_eq!(create_mock.hits_async().await, 0);
    Ok(())
}

/// 401/403 代表 service-role key 本身有問題，呼叫端只看到 500
#[tokio::test]
async fn test_unauthorized_key_is_server_fault() -> Result<()> {
    let server = MockServer::start_async().await;
    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(401).json_body(json!({
                "message": format!("Invalid API key: {}", SERVICE_KEY)
            }));
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    let response = handler.handle("POST", Some(&demo_body())).await;

    assert_eq!(create_mock.hits_async().await, 1);
    assert_eq!(response.status, 500);
    assert!(!response.body.contains(SERVICE_KEY));
    assert!(!response.body.contains("Invalid API key"));
    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body, json!({ "error": "Failed to create user" }));
    Ok(())
}

#[tokio::test]
async fn test_forbidden_key_is_server_fault() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(403).json_body(json!({ "msg": "User not allowed" }));
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    let response = handler.handle("POST", Some(&demo_body())).await;

    assert_eq!(response.status, 500);
    assert!(!response.body.contains("User not allowed"));
    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body, json!({ "error": "Failed to create user" }));
    Ok(())
}

#[tokio::test]
async fn test_rejection_echoing_key_is_scrubbed() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/admin/users");
            then.status(422).json_body(json!({
                "msg": format!("Unable to validate request for key {}", SERVICE_KEY)
            }));
        })
        .await;

    let handler = handler_for(&server, Duration::from_secs(5));
    let response = handler.handle("POST", Some(&demo_body())).await;

    assert_eq!(response.status, 400);
    assert!(!response.body.contains(SERVICE_KEY));
    assert!(response
        .body
        .contains("Unable to validate request for key [REDACTED]"));
    Ok(())
}

use async_trait::async_trait;
use school_admin::domain::model::{AuthUserRecord, CreateUserAttributes};
use school_admin::domain::ports::{AdminCallError, AuthAdmin};
use school_admin::{ProvisioningHandler, ProvisioningService, RequestValidator};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 回傳固定使用者的假 auth 服務
#[derive(Default)]
struct StubAdmin {
    calls: AtomicUsize,
}

#[async_trait]
impl AuthAdmin for StubAdmin {
    async fn create_user(
        &self,
        attributes: &CreateUserAttributes<'_>,
    ) -> Result<AuthUserRecord, AdminCallError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AuthUserRecord {
            id: Some(format!("user-{}", n)),
            email: Some(attributes.email.to_string()),
            user_metadata: Some(attributes.user_metadata.clone()),
            created_at: None,
        })
    }
}

fn handler(origin: &str) -> ProvisioningHandler<StubAdmin> {
    ProvisioningHandler::new(
        ProvisioningService::new(
            StubAdmin::default(),
            RequestValidator::default(),
            Duration::from_secs(1),
        ),
        origin,
    )
}

#[tokio::test]
async fn test_preflight_returns_cors_headers() {
    let handler = handler("https://admin.example-school.org");
    let response = handler.handle("OPTIONS", None).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "ok");
    assert_eq!(
        response.headers["Access-Control-Allow-Origin"],
        "https://admin.example-school.org"
    );
    assert!(response.headers["Access-Control-Allow-Methods"].contains("POST"));
    assert_eq!(handler.service().admin().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_other_methods_are_refused() {
    let handler = handler("*");
    for method in ["GET", "PUT", "DELETE"] {
        let response = handler.handle(method, Some("{}")).await;
        assert_eq!(response.status, 405);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body, json!({ "error": "Method not allowed" }));
    }
}

#[tokio::test]
async fn test_post_without_body_is_bad_request() {
    let handler = handler("*");
    for body in [None, Some(""), Some("   ")] {
        let response = handler.handle("post", body).await;
        assert_eq!(response.status, 400);
    }
    assert_eq!(handler.service().admin().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let handler = Arc::new(handler("*"));
    let mut tasks = Vec::new();
    for i in 0..8 {
        let handler = Arc::clone(&handler);
        tasks.push(tokio::spawn(async move {
            let body = json!({
                "email": format!("student{}@example.com", i),
                "password": "Passw0rd!",
                "role": "student"
            });
            handler.handle("POST", Some(&body.to_string())).await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let response = task.await.unwrap();
        assert_eq!(response.status, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["user"]["email"], json!(format!("student{}@example.com", i)));
        assert_eq!(body["user"]["metadata"]["role"], json!("student"));
    }
    assert_eq!(handler.service().admin().calls.load(Ordering::SeqCst), 8);
}

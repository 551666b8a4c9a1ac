use crate::core::provisioning::{ProvisioningResult, ProvisioningService};
use crate::domain::ports::AuthAdmin;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

/// Status code plus JSON body: `{ "user": .. }` or `{ "error": .. }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningResponse {
    pub status: u16,
    pub body: Value,
}

impl ProvisioningResponse {
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "error": message.into() }),
        }
    }
}

impl From<ProvisioningResult> for ProvisioningResponse {
    fn from(result: ProvisioningResult) -> Self {
        match result {
            Ok(account) => Self {
                status: 200,
                body: json!({ "user": account }),
            },
            Err(err) => Self::error(err.status_code(), err.public_message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Routes an HTTP-style request to the provisioning service.
pub struct ProvisioningHandler<A: AuthAdmin> {
    service: ProvisioningService<A>,
    allowed_origin: String,
}

impl<A: AuthAdmin> ProvisioningHandler<A> {
    pub fn new(service: ProvisioningService<A>, allowed_origin: impl Into<String>) -> Self {
        Self {
            service,
            allowed_origin: allowed_origin.into(),
        }
    }

    pub fn service(&self) -> &ProvisioningService<A> {
        &self.service
    }

    pub async fn handle(&self, method: &str, body: Option<&str>) -> HttpResponse {
        let response = match method.to_ascii_uppercase().as_str() {
            // 瀏覽器的 CORS 預檢請求
            "OPTIONS" => return self.respond(200, "ok".to_string()),
            "POST" => match body {
                Some(body) if !body.trim().is_empty() => {
                    ProvisioningResponse::from(self.service.handle(body).await)
                }
                _ => ProvisioningResponse::error(400, "Request body is required"),
            },
            other => {
                tracing::warn!("Method {} not allowed", other);
                ProvisioningResponse::error(405, "Method not allowed")
            }
        };

        self.respond(response.status, response.body.to_string())
    }

    fn respond(&self, status: u16, body: String) -> HttpResponse {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Access-Control-Allow-Origin".to_string(),
            self.allowed_origin.clone(),
        );
        headers.insert(
            "Access-Control-Allow-Headers".to_string(),
            "authorization, x-client-info, apikey, content-type".to_string(),
        );
        headers.insert(
            "Access-Control-Allow-Methods".to_string(),
            "POST, OPTIONS".to_string(),
        );
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        HttpResponse {
            status,
            headers,
            body,
        }
    }
}

//! Service-role client. Only the provisioning function builds one; the module
//! does not exist in `wasm32` (browser) builds.

use crate::adapters::credential::{PrivilegedCredential, SecretString};
use crate::adapters::http::{
    build_http_client, describe_transport_error, extract_error_message, invalid_header,
    normalize_endpoint,
};
use crate::domain::model::{AuthUserRecord, CreateUserAttributes};
use crate::domain::ports::{AdminCallError, AuthAdmin};
use crate::utils::error::{AdminError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const SERVICE_ROLE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

const ADMIN_USERS_PATH: &str = "/auth/v1/admin/users";

#[derive(Debug)]
pub struct PrivilegedClient {
    endpoint: String,
    credential: PrivilegedCredential,
    api_key_header: HeaderValue,
    authorization_header: HeaderValue,
    client: Client,
}

/// Builds the service-role handle.
///
/// An absent or blank key is an error. There is no fallback to the anon key.
pub fn build_privileged_client(
    endpoint: &str,
    secret_key: Option<SecretString>,
    timeout: Duration,
) -> Result<PrivilegedClient> {
    let credential = secret_key
        .and_then(PrivilegedCredential::new)
        .ok_or_else(|| AdminError::MissingConfigError {
            field: SERVICE_ROLE_KEY_VAR.to_string(),
        })?;
    let endpoint = normalize_endpoint("supabase_url", endpoint)?;

    let mut api_key_header = HeaderValue::from_str(credential.expose())
        .map_err(|_| invalid_header(SERVICE_ROLE_KEY_VAR))?;
    api_key_header.set_sensitive(true);
    let mut authorization_header =
        HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
            .map_err(|_| invalid_header(SERVICE_ROLE_KEY_VAR))?;
    authorization_header.set_sensitive(true);

    tracing::debug!("Building privileged client for {}", endpoint);

    Ok(PrivilegedClient {
        endpoint,
        credential,
        api_key_header,
        authorization_header,
        client: build_http_client(timeout)?,
    })
}

impl PrivilegedClient {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credential(&self) -> &PrivilegedCredential {
        &self.credential
    }

    fn parse_user_record(&self, body: &str) -> std::result::Result<AuthUserRecord, AdminCallError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            AdminCallError::Transport(format!("auth service returned invalid JSON: {}", e))
        })?;

        // supabase-js 會把使用者包在 `user` 之下，GoTrue 直接回傳使用者物件
        let user = match value.get("user") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => value,
        };
        serde_json::from_value(user).map_err(|e| {
            AdminCallError::Transport(format!("auth service returned an unexpected user shape: {}", e))
        })
    }
}

#[async_trait]
impl AuthAdmin for PrivilegedClient {
    async fn create_user(
        &self,
        attributes: &CreateUserAttributes<'_>,
    ) -> std::result::Result<AuthUserRecord, AdminCallError> {
        let url = format!("{}{}", self.endpoint, ADMIN_USERS_PATH);
        tracing::debug!("POST {} for {}", url, attributes.email);

        let response = self
            .client
            .post(&url)
            .header("apikey", self.api_key_header.clone())
            .header(AUTHORIZATION, self.authorization_header.clone())
            .json(attributes)
            .send()
            .await
            .map_err(|e| AdminCallError::Transport(describe_transport_error(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AdminCallError::Transport(describe_transport_error(&e)))?;
        tracing::debug!("Auth service response status: {}", status);

        if status.is_success() {
            return self.parse_user_record(&body);
        }

        let message = extract_error_message(&body).map(|m| self.credential.scrub(&m));
        // 401/403 是我們自己的 key 有問題，不是呼叫端的錯
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(AdminCallError::Transport(format!(
                "auth service refused the service-role key ({}): {}",
                status,
                message.unwrap_or_else(|| "no error message".to_string())
            )))
        } else if status.is_client_error() {
            Err(AdminCallError::Rejected {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request rejected")
                        .to_string()
                }),
            })
        } else {
            Err(AdminCallError::Transport(format!(
                "auth service returned {}: {}",
                status,
                message.unwrap_or_else(|| "no error message".to_string())
            )))
        }
    }
}

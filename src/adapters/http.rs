use crate::utils::error::{AdminError, Result};
use crate::utils::validation::validate_url;
use reqwest::Client;
use std::time::Duration;

/// Supabase answers errors with one of these keys depending on the service
/// (GoTrue uses `msg`/`error_description`, PostgREST uses `message`).
const MESSAGE_KEYS: [&str; 4] = ["msg", "message", "error_description", "error"];

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("school-admin/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// 驗證並去掉結尾的 `/`，之後直接以字串拼接路徑
pub(crate) fn normalize_endpoint(field_name: &str, endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    validate_url(field_name, endpoint)?;
    Ok(endpoint.trim_end_matches('/').to_string())
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    MESSAGE_KEYS.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

pub(crate) fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}

pub(crate) fn invalid_header(field_name: &str) -> AdminError {
    AdminError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: crate::adapters::credential::REDACTED.to_string(),
        reason: "Key contains characters that are not valid in an HTTP header".to_string(),
    }
}

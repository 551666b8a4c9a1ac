use crate::adapters::credential::SecretString;
use crate::domain::model::{Metadata, ProvisioningRequest};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_PASSWORD_LENGTH_FLOOR: usize = 6;
/// bcrypt 只取前 72 bytes，更長的密碼會被靜默截斷
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object: {reason}")]
    MalformedBody { reason: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid email address")]
    MalformedEmail,

    #[error("Password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("Password must be at most {max_bytes} bytes")]
    PasswordTooLong { max_bytes: usize },

    #[error("Metadata value for '{key}' must be a string, number, boolean or null")]
    InvalidMetadata { key: String },
}

/// Inbound body before validation. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawProvisioningRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length: min_length.clamp(MIN_PASSWORD_LENGTH_FLOOR, MAX_PASSWORD_BYTES),
        }
    }

    fn check(&self, password: &str) -> Result<(), ValidationError> {
        if password.chars().count() < self.min_length {
            return Err(ValidationError::WeakPassword {
                min_length: self.min_length,
            });
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(ValidationError::PasswordTooLong {
                max_bytes: MAX_PASSWORD_BYTES,
            });
        }
        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH)
    }
}

/// Turns untrusted request bodies into [`ProvisioningRequest`]s. Performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    policy: PasswordPolicy,
}

impl RequestValidator {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PasswordPolicy {
        self.policy
    }

    pub fn validate(&self, raw_body: &str) -> Result<ProvisioningRequest, ValidationError> {
        let value: Value =
            serde_json::from_str(raw_body).map_err(|e| ValidationError::MalformedBody {
                reason: e.to_string(),
            })?;
        if !value.is_object() {
            return Err(ValidationError::MalformedBody {
                reason: "expected an object".to_string(),
            });
        }
        let raw: RawProvisioningRequest =
            serde_json::from_value(value).map_err(|e| ValidationError::MalformedBody {
                reason: e.to_string(),
            })?;
        self.validate_raw(raw)
    }

    pub fn validate_raw(
        &self,
        raw: RawProvisioningRequest,
    ) -> Result<ProvisioningRequest, ValidationError> {
        let email = raw
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(ValidationError::MissingField { field: "email" })?;
        let password = raw
            .password
            .filter(|p| !p.is_empty())
            .ok_or(ValidationError::MissingField { field: "password" })?;

        if !is_plausible_email(&email) {
            return Err(ValidationError::MalformedEmail);
        }
        self.policy.check(&password)?;

        let mut metadata = raw.metadata.unwrap_or_default();
        if let Some((key, _)) = metadata.iter().find(|(_, v)| v.is_array() || v.is_object()) {
            return Err(ValidationError::InvalidMetadata { key: key.clone() });
        }

        // 沒有明確的 role 時，沿用 metadata.role（字串才算）
        let role = raw
            .role
            .or_else(|| metadata.get("role").and_then(Value::as_str).map(str::to_string))
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if let Some(role) = &role {
            metadata.insert("role".to_string(), Value::String(role.clone()));
        }

        Ok(ProvisioningRequest {
            email,
            password: SecretString::new(password),
            role,
            metadata,
        })
    }
}

/// Validates with the default password policy.
pub fn validate(raw_body: &str) -> Result<ProvisioningRequest, ValidationError> {
    RequestValidator::default().validate(raw_body)
}

fn is_plausible_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+$").expect("email pattern is a valid regex")
    });
    re.is_match(email)
}

use crate::adapters::credential::SecretString;
use crate::adapters::privileged::{build_privileged_client, PrivilegedClient, SERVICE_ROLE_KEY_VAR};
use crate::core::handler::DEFAULT_ALLOWED_ORIGIN;
use crate::core::validator::{
    PasswordPolicy, DEFAULT_MIN_PASSWORD_LENGTH, MAX_PASSWORD_BYTES, MIN_PASSWORD_LENGTH_FLOOR,
};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
pub const TIMEOUT_VAR: &str = "PROVISION_TIMEOUT_SECONDS";
pub const PASSWORD_MIN_LENGTH_VAR: &str = "PASSWORD_MIN_LENGTH";
pub const ALLOWED_ORIGIN_VAR: &str = "CORS_ALLOWED_ORIGIN";

const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Configuration of the provisioning function. Read only from the process
/// environment, never from request data.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub supabase_url: String,
    pub service_role_key: SecretString,
    pub timeout_seconds: u64,
    pub password_min_length: usize,
    pub allowed_origin: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 以任意來源讀取設定（測試時用 HashMap 取代環境變數）
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let supabase_url = non_blank(SUPABASE_URL_VAR);
        let supabase_url = validate_required_field(SUPABASE_URL_VAR, &supabase_url)?.clone();

        let service_role_key = non_blank(SERVICE_ROLE_KEY_VAR).map(SecretString::new);
        let service_role_key =
            validate_required_field(SERVICE_ROLE_KEY_VAR, &service_role_key)?.clone();

        let config = Self {
            supabase_url,
            service_role_key,
            timeout_seconds: parse_or(TIMEOUT_VAR, non_blank(TIMEOUT_VAR), DEFAULT_TIMEOUT_SECONDS)?,
            password_min_length: parse_or(
                PASSWORD_MIN_LENGTH_VAR,
                non_blank(PASSWORD_MIN_LENGTH_VAR),
                DEFAULT_MIN_PASSWORD_LENGTH,
            )?,
            allowed_origin: non_blank(ALLOWED_ORIGIN_VAR)
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.password_min_length)
    }

    pub fn privileged_client(&self) -> Result<PrivilegedClient> {
        build_privileged_client(
            &self.supabase_url,
            Some(self.service_role_key.clone()),
            self.timeout(),
        )
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_url("supabase_url", &self.supabase_url)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 60)?;
        validate_range(
            "password_min_length",
            self.password_min_length,
            MIN_PASSWORD_LENGTH_FLOOR,
            MAX_PASSWORD_BYTES,
        )?;
        validate_non_empty_string("allowed_origin", &self.allowed_origin)?;

        tracing::debug!("✅ Server configuration validation passed");
        Ok(())
    }
}

fn parse_or<T: FromStr>(field_name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AdminError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: raw.clone(),
                reason: "Value must be a positive integer".to_string(),
            }),
    }
}

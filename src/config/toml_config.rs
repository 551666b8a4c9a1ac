use crate::adapters::restricted::DEFAULT_QUERY_LIMIT;
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Client-side configuration file for the diagnostic CLI.
///
/// Only the anon key belongs here. `[supabase]` rejects unknown fields, so a
/// `service_role_key` entry makes the whole file fail to load.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub supabase: SupabaseConfig,
    pub diagnostics: Option<DiagnosticsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    pub default_limit: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdminError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        // 只取錯誤訊息，不附帶原始行內容（可能含有誤放的密鑰）
        toml::from_str(&processed_content).map_err(|e| AdminError::ConfigError {
            message: format!("TOML parsing error: {}", e.message()),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_URL})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn default_limit(&self) -> usize {
        self.diagnostics
            .as_ref()
            .and_then(|d| d.default_limit)
            .unwrap_or(DEFAULT_QUERY_LIMIT)
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.diagnostics.as_ref().and_then(|d| d.timeout_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("supabase.url", &self.supabase.url)?;
        validate_non_empty_string("supabase.anon_key", &self.supabase.anon_key)?;
        validate_range("diagnostics.default_limit", self.default_limit(), 1, 1000)?;
        if let Some(timeout) = self.timeout_seconds() {
            validate_range("diagnostics.timeout_seconds", timeout, 1, 120)?;
        }
        Ok(())
    }
}

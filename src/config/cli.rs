use crate::adapters::restricted::{Table, TableQuery, DEFAULT_QUERY_LIMIT};
use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use clap::Parser;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Parser)]
#[command(name = "school-admin")]
#[command(about = "Read-only diagnostic queries against the school database")]
pub struct CliConfig {
    /// Collection to read
    #[arg(long, value_enum)]
    pub table: Table,

    /// Column to filter on (equality)
    #[arg(long, requires = "value")]
    pub column: Option<String>,

    /// Value the column must equal
    #[arg(long, requires = "column")]
    pub value: Option<String>,

    /// Maximum number of rows
    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Public anon key (never the service-role key)
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub anon_key: Option<String>,

    /// Optional TOML file with `[supabase]` and `[diagnostics]` tables
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Fully resolved settings for one diagnostic run.
#[derive(Debug, Clone)]
pub struct DiagnosticSettings {
    pub supabase_url: String,
    pub anon_key: String,
    pub query: TableQuery,
    pub timeout: Duration,
}

impl CliConfig {
    /// 命令列參數優先，其次是 TOML 檔案
    pub fn resolve(&self) -> Result<DiagnosticSettings> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Some(file)
            }
            None => None,
        };

        let supabase_url = self
            .supabase_url
            .clone()
            .or_else(|| file.as_ref().map(|f| f.supabase.url.clone()));
        let anon_key = self
            .anon_key
            .clone()
            .or_else(|| file.as_ref().map(|f| f.supabase.anon_key.clone()));
        let limit = self
            .limit
            .or_else(|| file.as_ref().map(TomlConfig::default_limit))
            .unwrap_or(DEFAULT_QUERY_LIMIT);
        let timeout_seconds = self
            .timeout_seconds
            .or_else(|| file.as_ref().and_then(TomlConfig::timeout_seconds))
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let mut query = TableQuery::new(self.table).limit(limit);
        if let (Some(column), Some(value)) = (&self.column, &self.value) {
            query = query.filter_eq(column.clone(), value.clone());
        }

        let settings = DiagnosticSettings {
            supabase_url: validate_required_field("SUPABASE_URL", &supabase_url)?.clone(),
            anon_key: validate_required_field("SUPABASE_ANON_KEY", &anon_key)?.clone(),
            query,
            timeout: Duration::from_secs(timeout_seconds),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for DiagnosticSettings {
    fn validate(&self) -> Result<()> {
        validate_url("supabase_url", &self.supabase_url)?;
        validate_non_empty_string("anon_key", &self.anon_key)?;
        validate_range("limit", self.query.limit, 1, 1000)?;
        validate_range("timeout_seconds", self.timeout.as_secs(), 1, 120)?;
        if let Some((column, _)) = &self.query.filter {
            validate_non_empty_string("column", column)?;
        }
        Ok(())
    }
}

use crate::adapters::credential::RestrictedCredential;
use crate::adapters::http::{build_http_client, extract_error_message, normalize_endpoint};
use crate::utils::error::{AdminError, Result};
use crate::utils::validation::validate_non_empty_string;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_QUERY_LIMIT: usize = 5;

/// Collections the diagnostic queries may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Table {
    Students,
    Teachers,
    Schools,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Students => "students",
            Table::Teachers => "teachers",
            Table::Schools => "schools",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `select * from <table> [where <column> = <value>] limit <n>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: Table,
    pub filter: Option<(String, String)>,
    pub limit: usize,
}

impl TableQuery {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            filter: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }

    pub fn filter_eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter = Some((column.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        if let Some((column, value)) = &self.filter {
            pairs.push((column.clone(), format!("eq.{}", value)));
        }
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs
    }
}

/// Anon-key client. Safe to construct in any process.
#[derive(Debug, Clone)]
pub struct RestrictedClient {
    endpoint: String,
    credential: RestrictedCredential,
    client: Client,
}

pub fn build_restricted_client(
    endpoint: &str,
    public_key: &str,
    timeout: Duration,
) -> Result<RestrictedClient> {
    validate_non_empty_string("anon_key", public_key)?;
    let endpoint = normalize_endpoint("supabase_url", endpoint)?;

    Ok(RestrictedClient {
        endpoint,
        credential: RestrictedCredential::new(public_key.trim()),
        client: build_http_client(timeout)?,
    })
}

impl RestrictedClient {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credential(&self) -> &RestrictedCredential {
        &self.credential
    }

    pub async fn select(&self, query: &TableQuery) -> Result<Vec<Value>> {
        let url = format!("{}/rest/v1/{}", self.endpoint, query.table);
        tracing::debug!("Querying {} with {:?}", url, query.filter);

        let response = self
            .client
            .get(&url)
            .header("apikey", self.credential.as_str())
            .bearer_auth(self.credential.as_str())
            .query(&query.query_pairs())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Query response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdminError::QueryRejected {
                status: status.as_u16(),
                message: extract_error_message(&body).unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                }),
            });
        }

        match response.json::<Value>().await? {
            Value::Array(rows) => Ok(rows),
            other => Err(AdminError::UnexpectedResponse {
                message: format!("Expected an array of rows from {}, got {}", query.table, other),
            }),
        }
    }
}

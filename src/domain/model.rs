use crate::adapters::credential::SecretString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat attribute bag stored as the collaborator's `user_metadata`.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A validated account-creation request. `metadata` already contains `role`.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
    pub email: String,
    pub password: SecretString,
    pub role: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionedAccount {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of the collaborator's admin "create user" call.
#[derive(Serialize)]
pub struct CreateUserAttributes<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub email_confirm: bool,
    pub user_metadata: &'a Metadata,
}

impl<'a> CreateUserAttributes<'a> {
    /// 管理員建立的帳號一律視為已驗證信箱
    pub fn from_request(request: &'a ProvisioningRequest) -> Self {
        Self {
            email: &request.email,
            password: request.password.expose(),
            email_confirm: true,
            user_metadata: &request.metadata,
        }
    }
}

impl fmt::Debug for CreateUserAttributes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUserAttributes")
            .field("email", &self.email)
            .field("password", &crate::adapters::credential::REDACTED)
            .field("email_confirm", &self.email_confirm)
            .field("user_metadata", &self.user_metadata)
            .finish()
    }
}

/// User object as returned by the collaborator. Only the fields this crate
/// projects are modelled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthUserRecord {
    pub id: Option<String>,
    pub email: Option<String>,
    pub user_metadata: Option<Metadata>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    ExternalRejection,
    Transport,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::ExternalRejection => 400,
            ErrorKind::Transport => 500,
        }
    }
}

use crate::core::validator::{RequestValidator, ValidationError};
use crate::domain::model::{
    AuthUserRecord, CreateUserAttributes, ErrorKind, ProvisionedAccount, ProvisioningRequest,
};
use crate::domain::ports::{AdminCallError, AuthAdmin};
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Response text for transport failures. Details only go to the server log.
pub const TRANSPORT_PUBLIC_MESSAGE: &str = "Failed to create user";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    ExternalRejection { status: u16, message: String },

    #[error("transport failure: {detail}")]
    Transport { detail: String },
}

impl ProvisioningError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProvisioningError::Validation(_) => ErrorKind::Validation,
            ProvisioningError::ExternalRejection { .. } => ErrorKind::ExternalRejection,
            ProvisioningError::Transport { .. } => ErrorKind::Transport,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ProvisioningError::Validation(e) => e.to_string(),
            ProvisioningError::ExternalRejection { message, .. } => message.clone(),
            ProvisioningError::Transport { .. } => TRANSPORT_PUBLIC_MESSAGE.to_string(),
        }
    }
}

impl From<AdminCallError> for ProvisioningError {
    fn from(err: AdminCallError) -> Self {
        match err {
            AdminCallError::Rejected { status, message } => {
                ProvisioningError::ExternalRejection { status, message }
            }
            AdminCallError::Transport(detail) => ProvisioningError::Transport { detail },
        }
    }
}

pub type ProvisioningResult = std::result::Result<ProvisionedAccount, ProvisioningError>;

/// Creates accounts through an [`AuthAdmin`]. Holds no per-request state, so a
/// single instance serves concurrent requests.
pub struct ProvisioningService<A: AuthAdmin> {
    admin: A,
    validator: RequestValidator,
    timeout: Duration,
}

impl<A: AuthAdmin> ProvisioningService<A> {
    pub fn new(admin: A, validator: RequestValidator, timeout: Duration) -> Self {
        Self {
            admin,
            validator,
            timeout,
        }
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    /// Validates `raw_body` and, only if it is valid, provisions the account.
    pub async fn handle(&self, raw_body: &str) -> ProvisioningResult {
        let request = self.validator.validate(raw_body).map_err(|e| {
            tracing::info!("Rejected provisioning request: {}", e);
            e
        })?;
        self.provision(&request).await
    }

    /// Single attempt, no retries: the collaborator does not guarantee that
    /// account creation is idempotent.
    pub async fn provision(&self, request: &ProvisioningRequest) -> ProvisioningResult {
        tracing::info!(
            "📨 Provisioning account for {} (role: {})",
            request.email,
            request.role.as_deref().unwrap_or("none")
        );

        let attributes = CreateUserAttributes::from_request(request);
        let outcome = tokio::time::timeout(self.timeout, self.admin.create_user(&attributes)).await;

        let record = match outcome {
            Ok(Ok(record)) => record,
            Ok(Err(err)) => {
                let err = ProvisioningError::from(err);
                log_failure(&request.email, &err);
                return Err(err);
            }
            Err(_) => {
                // 遠端可能已經建立帳號，這裡只放棄等待，不嘗試取消
                let err = ProvisioningError::Transport {
                    detail: format!("auth service did not answer within {:?}", self.timeout),
                };
                log_failure(&request.email, &err);
                return Err(err);
            }
        };

        let account = project_account(record, &request.email).map_err(|err| {
            log_failure(&request.email, &err);
            err
        })?;
        tracing::info!("✅ Created account {} for {}", account.id, account.email);
        Ok(account)
    }
}

fn log_failure(email: &str, err: &ProvisioningError) {
    match err {
        ProvisioningError::Transport { detail } => {
            tracing::error!("❌ Provisioning {} failed: {}", email, detail)
        }
        other => tracing::warn!("⚠️ Provisioning {} rejected: {}", email, other),
    }
}

/// Maps the collaborator's user object onto [`ProvisionedAccount`].
pub fn project_account(
    record: AuthUserRecord,
    requested_email: &str,
) -> Result<ProvisionedAccount, ProvisioningError> {
    let id = record
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ProvisioningError::Transport {
            detail: "auth service response is missing the user id".to_string(),
        })?;

    let metadata = record.user_metadata.unwrap_or_default();
    let role = metadata
        .get("role")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let created_at = record
        .created_at
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc));

    Ok(ProvisionedAccount {
        id,
        email: record
            .email
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| requested_email.to_string()),
        role,
        metadata,
        created_at,
    })
}

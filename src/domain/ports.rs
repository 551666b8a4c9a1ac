use crate::domain::model::{AuthUserRecord, CreateUserAttributes};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a call to the auth collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminCallError {
    /// The collaborator refused the request through its normal error channel.
    #[error("rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Network failure, timeout, server fault or an unreadable response.
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Administrative surface of the external authentication service.
#[async_trait]
pub trait AuthAdmin: Send + Sync {
    async fn create_user(
        &self,
        attributes: &CreateUserAttributes<'_>,
    ) -> std::result::Result<AuthUserRecord, AdminCallError>;
}

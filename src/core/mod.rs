pub mod handler;
pub mod provisioning;
pub mod validator;

pub use crate::domain::model::{ProvisionedAccount, ProvisioningRequest};
pub use crate::domain::ports::AuthAdmin;
pub use crate::utils::error::Result;

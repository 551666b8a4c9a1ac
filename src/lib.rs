pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(not(target_arch = "wasm32"))]
pub use adapters::privileged::{build_privileged_client, PrivilegedClient};
#[cfg(not(target_arch = "wasm32"))]
pub use config::server::ServerConfig;

pub use adapters::restricted::{build_restricted_client, RestrictedClient, Table, TableQuery};
pub use core::handler::{HttpResponse, ProvisioningHandler, ProvisioningResponse};
pub use core::provisioning::{ProvisioningError, ProvisioningResult, ProvisioningService};
pub use core::validator::{PasswordPolicy, RequestValidator, ValidationError};
pub use utils::error::{AdminError, Result};

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
#[cfg(feature = "cli")]
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, DiagnosticSettings};

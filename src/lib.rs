pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{HttpContentStore, SecurePrivacyClient};
pub use crate::config::IntegrationConfig;
pub use crate::core::installer::{BannerInstaller, ToolOutcome};
pub use crate::server::{build_router, run_server, state::AppState};
pub use crate::utils::error::{InstallError, Result};

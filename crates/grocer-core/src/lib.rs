mod app_config;
mod config;
mod products;
mod sites;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{ArtifactPayload, ParseResult, Product};
pub use sites::{Site, SUPPORTED_SITES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unsupported site: {0}. Supported sites: {supported}", supported = SUPPORTED_SITES.join(", "))]
    UnsupportedSite(String),
}

use thiserror::Error;

pub mod app_config;
mod config;
pub mod dates;
pub mod facts;
pub mod money;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};

/// Errors raised while assembling [`AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

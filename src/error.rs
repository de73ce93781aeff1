//! Startup error types. Every variant is fatal: `main` prints it and exits.

use thiserror::Error;

use crate::config::ConfigError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("server error: {0}")]
    Server(String),
}

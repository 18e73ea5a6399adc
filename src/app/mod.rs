//! Application composition: shared state and the submission path
mod state;

pub use state::{AppState, StateProvider};

use crate::core::types::MessageHash;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Generator error: {0}")]
    Generator(#[from] crate::generator::GeneratorError),

    #[error("Message already stored: {0}")]
    Duplicate(MessageHash),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Application result type
pub type Result<T> = std::result::Result<T, AppError>;

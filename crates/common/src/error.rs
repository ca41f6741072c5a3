//! Error types for Playbill

use thiserror::Error;

use crate::retry::{Classify, FailureKind, PolicyError};

/// Result type alias using Playbill Error
pub type Result<T> = std::result::Result<T, Error>;

/// Playbill error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown environment: {name}. Available: {available}")]
    UnknownEnvironment { name: String, available: String },

    #[error("Invalid retry policy: {0}")]
    Policy(#[from] PolicyError),
}

impl Error {
    /// Build an `InvalidConfig` error for a variable that failed to parse
    pub fn invalid_var(key: &str, value: &str, reason: impl std::fmt::Display) -> Self {
        Error::InvalidConfig(format!("{}={:?}: {}", key, value, reason))
    }
}

impl Classify for Error {
    fn kind(&self) -> FailureKind {
        match self {
            Error::Io(e) => Classify::kind(e),
            _ => FailureKind::Custom("config"),
        }
    }
}

//! Playbill Common Library
//!
//! Retry executor, run settings and environment presets shared by the
//! Playbill screenplay crate and CLI.

pub mod environments;
pub mod error;
pub mod retry;
pub mod settings;

// Re-export commonly used types
pub use environments::EnvironmentConfig;
pub use error::{Error, Result};
pub use retry::{
    retry, with_retry, Classify, FailureKind, PolicyError, RetryBuilder, RetryError,
    RetryPolicy, Retrying,
};
pub use settings::{BrowserKind, BrowserSettings, EnvironmentSettings, Settings, TestSettings};

/// Playbill version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

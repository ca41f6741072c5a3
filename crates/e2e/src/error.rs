//! Error types for screenplay runs

use playbill_common::retry::{Classify, FailureKind, RetryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Actor {actor} does not have the ability {ability}")]
    MissingAbility { actor: String, ability: &'static str },

    #[error("Configuration error: {0}")]
    Config(#[from] playbill_common::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Retry(Box<RetryError<E2eError>>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

impl From<RetryError<E2eError>> for E2eError {
    fn from(err: RetryError<E2eError>) -> Self {
        E2eError::Retry(Box::new(err))
    }
}

impl Classify for E2eError {
    fn kind(&self) -> FailureKind {
        match self {
            E2eError::Timeout(_) => FailureKind::Timeout,
            E2eError::ElementNotFound(_) => FailureKind::ElementNotFound,
            E2eError::NotInteractable(_) => FailureKind::ElementNotInteractable,
            E2eError::AssertionFailed(_) => FailureKind::Assertion,
            E2eError::Io(e) => Classify::kind(e),
            E2eError::Retry(e) => Classify::kind(e.as_ref()),
            E2eError::PlaywrightNotFound => FailureKind::Custom("playwright_missing"),
            E2eError::Playwright(_) => FailureKind::Custom("playwright"),
            E2eError::MissingAbility { .. } => FailureKind::Custom("missing_ability"),
            E2eError::Config(_) => FailureKind::Custom("config"),
            E2eError::Logging(_) => FailureKind::Custom("logging"),
            E2eError::Json(_) => FailureKind::Custom("json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_browser_failures_classify() {
        assert_eq!(E2eError::Timeout("#submit".into()).kind(), FailureKind::Timeout);
        assert_eq!(
            E2eError::ElementNotFound("#error".into()).kind(),
            FailureKind::ElementNotFound
        );
        assert_eq!(
            E2eError::AssertionFailed("url".into()).kind(),
            FailureKind::Assertion
        );
    }

    #[test]
    fn test_io_error_uses_io_classification() {
        let err = E2eError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert_eq!(err.kind(), FailureKind::Connection);
    }

    #[test]
    fn test_missing_ability_message() {
        let err = E2eError::MissingAbility { actor: "Alice".into(), ability: "BrowseTheWeb" };
        assert_eq!(err.to_string(), "Actor Alice does not have the ability BrowseTheWeb");
    }
}

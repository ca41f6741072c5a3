//! Errors surfaced by the retry executor

use std::time::Duration;
use thiserror::Error;

use super::kind::{Classify, FailureKind};
use super::policy::PolicyError;

/// Outcome of a retry sequence that did not produce a value.
/// `E` is the wrapped operation's own error type.
#[derive(Error, Debug)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// The policy could not be built; the operation never ran
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("{operation} failed with non-retryable {kind} error on attempt {attempt}: {source}")]
    NonRetryable {
        operation: String,
        attempt: u32,
        kind: FailureKind,
        source: E,
    },

    #[error("{operation} failed after {attempts} attempts ({waited:?} spent waiting): {source}")]
    Exhausted {
        operation: String,
        attempts: u32,
        waited: Duration,
        source: E,
    },

    #[error("{operation} cancelled after {attempts} attempts")]
    Cancelled {
        operation: String,
        attempts: u32,
        last: Option<E>,
    },
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Number of times the operation was invoked
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Policy(_) => 0,
            RetryError::NonRetryable { attempt, .. } => *attempt,
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Cancelled { attempts, .. } => *attempts,
        }
    }

    /// The last failure the operation produced, if it ran at all
    pub fn last_error(&self) -> Option<&E> {
        match self {
            RetryError::Policy(_) => None,
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Cancelled { last, .. } => last.as_ref(),
        }
    }

    pub fn into_last_error(self) -> Option<E> {
        match self {
            RetryError::Policy(_) => None,
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Cancelled { last, .. } => last,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    pub fn is_non_retryable(&self) -> bool {
        matches!(self, RetryError::NonRetryable { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }
}

impl<E> Classify for RetryError<E>
where
    E: std::error::Error + Classify + 'static,
{
    fn kind(&self) -> FailureKind {
        match self.last_error() {
            Some(e) => e.kind(),
            None if self.is_cancelled() => FailureKind::Custom("cancelled"),
            None => FailureKind::Custom("policy"),
        }
    }
}

//! Retry policy
//!
//! A policy is validated once, when it is built, and never changes
//! afterwards. Delays grow geometrically: the wait after failed attempt
//! `i` is `initial_delay * backoff_multiplier^(i - 1)`.

use std::time::Duration;
use thiserror::Error;

use super::kind::FailureKind;

/// Reasons a policy cannot be built
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1 (got {0})")]
    InvalidMaxAttempts(u32),

    #[error("backoff multiplier must be a positive finite number (got {0})")]
    InvalidBackoff(f64),
}

/// Immutable retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
    /// Empty means every failure is retryable
    retryable: Vec<FailureKind>,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);
    pub const DEFAULT_BACKOFF: f64 = 1.0;

    /// Name used in attempt events and errors until a caller picks one
    pub const DEFAULT_OPERATION: &'static str = "operation";

    /// Create a policy that retries on any failure
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        backoff_multiplier: f64,
    ) -> Result<Self, PolicyError> {
        if max_attempts < 1 {
            return Err(PolicyError::InvalidMaxAttempts(max_attempts));
        }
        if !backoff_multiplier.is_finite() || backoff_multiplier <= 0.0 {
            return Err(PolicyError::InvalidBackoff(backoff_multiplier));
        }

        Ok(Self {
            max_attempts,
            initial_delay,
            backoff_multiplier,
            retryable: Vec::new(),
        })
    }

    /// A single attempt, no waiting
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            retryable: Vec::new(),
        }
    }

    /// Three attempts, waiting 1 s then 2 s
    pub fn exponential() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            retryable: Vec::new(),
        }
    }

    /// Restrict retries to the given kinds. An empty list keeps "retry on any failure".
    pub fn retry_on<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = FailureKind>,
    {
        self.retryable = Vec::new();
        for kind in kinds {
            if !self.retryable.contains(&kind) {
                self.retryable.push(kind);
            }
        }
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn retryable_kinds(&self) -> &[FailureKind] {
        &self.retryable
    }

    /// Whether a failure of this kind may be retried
    pub fn is_retryable(&self, kind: FailureKind) -> bool {
        self.retryable.is_empty() || self.retryable.contains(&kind)
    }

    /// Wait before the attempt that follows failed attempt `attempt` (1-based).
    /// Saturates at `Duration::MAX` instead of overflowing.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.powi(exponent);
        let nanos = self.initial_delay.as_nanos() as f64 * factor;

        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            return Duration::MAX;
        }
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Every wait the policy can produce, in order (`max_attempts - 1` values)
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(move |attempt| self.delay_after(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_DELAY,
            backoff_multiplier: Self::DEFAULT_BACKOFF,
            retryable: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_zero_attempts_rejected() {
        let err = RetryPolicy::new(0, Duration::ZERO, 1.0).unwrap_err();
        assert_eq!(err, PolicyError::InvalidMaxAttempts(0));
    }

    #[test_case(0.0 ; "zero")]
    #[test_case(-2.0 ; "negative")]
    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinite")]
    fn test_bad_backoff_rejected(backoff: f64) {
        let err = RetryPolicy::new(3, Duration::from_millis(10), backoff).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidBackoff(_)));
    }

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), 2.0).unwrap();
        let delays: Vec<_> = policy.delays().collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[test]
    fn test_constant_delay_with_unit_backoff() {
        let policy = RetryPolicy::new(4, Duration::from_millis(250), 1.0).unwrap();
        assert!(policy.delays().all(|d| d == Duration::from_millis(250)));
    }

    #[test]
    fn test_huge_backoff_saturates() {
        let policy = RetryPolicy::new(200, Duration::from_secs(60), 10.0).unwrap();
        assert_eq!(policy.delay_after(150), Duration::MAX);
    }

    #[test]
    fn test_empty_filter_retries_everything() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(FailureKind::Assertion));
        assert!(policy.is_retryable(FailureKind::Custom("anything")));
    }

    #[test]
    fn test_filter_limits_retryable_kinds() {
        let policy = RetryPolicy::default()
            .retry_on([FailureKind::Timeout, FailureKind::Connection, FailureKind::Timeout]);
        assert_eq!(policy.retryable_kinds().len(), 2);
        assert!(policy.is_retryable(FailureKind::Timeout));
        assert!(!policy.is_retryable(FailureKind::Assertion));
    }

    #[test]
    fn test_default_is_short_constant_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.backoff_multiplier(), 1.0);
        assert!(policy.delays().all(|d| d == Duration::from_millis(100)));
    }

    #[test]
    fn test_exponential_preset_doubles() {
        let delays: Vec<_> = RetryPolicy::exponential().delays().collect();
        assert_eq!(delays, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn test_no_retry_has_single_attempt() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delays().count(), 0);
    }
}

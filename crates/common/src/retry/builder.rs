//! Fluent form: `with_retry(op, args).with_max_attempts(5).execute().await`
//!
//! The builder is a plain value; every setter consumes it and returns the
//! updated copy. Nothing is validated until `execute`, which assembles the
//! immutable [`RetryPolicy`] before the operation is first invoked.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::decorator::Retrying;
use super::error::RetryError;
use super::executor::RetryHooks;
use super::kind::{Classify, FailureKind};
use super::policy::RetryPolicy;
use super::recorder::AttemptRecorder;
use super::sleeper::Sleeper;

/// Start configuring a retried call of `op(args)`
pub fn with_retry<F, A, Fut, T, E>(op: F, args: A) -> RetryBuilder<F, A, E>
where
    F: Fn(A) -> Fut,
    A: Clone,
    Fut: Future<Output = Result<T, E>>,
{
    RetryBuilder {
        op,
        args,
        name: RetryPolicy::DEFAULT_OPERATION.to_string(),
        max_attempts: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
        delay: RetryPolicy::DEFAULT_DELAY,
        backoff: RetryPolicy::DEFAULT_BACKOFF,
        kinds: Vec::new(),
        hooks: RetryHooks::default(),
    }
}

pub struct RetryBuilder<F, A, E> {
    op: F,
    args: A,
    name: String,
    max_attempts: u32,
    delay: Duration,
    backoff: f64,
    kinds: Vec<FailureKind>,
    hooks: RetryHooks<E>,
}

impl<F, A, E> RetryBuilder<F, A, E> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backoff(mut self, multiplier: f64) -> Self {
        self.backoff = multiplier;
        self
    }

    /// Only retry failures of these kinds; anything else fails on first occurrence
    pub fn on_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = FailureKind>,
    {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn on_retry<C>(mut self, callback: C) -> Self
    where
        C: Fn(u32, &E) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_retry(callback);
        self
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.hooks = self.hooks.with_sleeper(sleeper);
        self
    }

    pub fn with_recorder(mut self, recorder: impl AttemptRecorder + 'static) -> Self {
        self.hooks = self.hooks.with_recorder(recorder);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.hooks = self.hooks.with_cancellation(token);
        self
    }

    /// The policy `execute` would run with
    pub fn policy(&self) -> Result<RetryPolicy, super::policy::PolicyError> {
        Ok(RetryPolicy::new(self.max_attempts, self.delay, self.backoff)?
            .retry_on(self.kinds.iter().copied()))
    }

    /// Run the configured retry loop
    pub async fn execute<Fut, T>(self) -> Result<T, RetryError<E>>
    where
        F: Fn(A) -> Fut,
        A: Clone,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Classify + 'static,
    {
        let policy = self.policy()?;
        let retrying = Retrying::new(policy, self.op)
            .named(self.name)
            .with_hooks(self.hooks);
        retrying.call(self.args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{CollectingRecorder, RecordingSleeper};
    use crate::retry::recorder::AttemptEvent;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    #[error("{0} failure")]
    struct Fail(FailureKind);

    impl Classify for Fail {
        fn kind(&self) -> FailureKind {
            self.0
        }
    }

    #[tokio::test]
    async fn test_defaults_match_decorator_defaults() {
        let builder = with_retry(|()| async { Ok::<_, Fail>(()) }, ());
        assert_eq!(builder.policy().unwrap(), RetryPolicy::default());
        assert_eq!(builder.policy().unwrap().backoff_multiplier(), 1.0);
    }

    #[tokio::test]
    async fn test_zero_attempts_fail_before_invocation() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(
            move |()| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, Fail>(1) }
            },
            (),
        )
        .with_max_attempts(0)
        .execute()
        .await;

        assert!(matches!(result, Err(RetryError::Policy(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_on_retry_fires_before_each_wait() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();

        let result = with_retry(|()| async { Err::<(), _>(Fail(FailureKind::Connection)) }, ())
            .with_max_attempts(3)
            .with_delay(Duration::from_millis(1))
            .with_sleeper(RecordingSleeper::new())
            .on_retry(move |attempt, err: &Fail| sink.lock().push((attempt, err.0)))
            .execute()
            .await;

        assert!(result.unwrap_err().is_exhausted());
        assert_eq!(
            *seen.lock(),
            vec![(1, FailureKind::Connection), (2, FailureKind::Connection)]
        );
    }

    #[tokio::test]
    async fn test_named_operation_appears_in_events() {
        let recorder = CollectingRecorder::new();

        with_retry(|name: &'static str| async move { Ok::<_, Fail>(name.len()) }, "login")
            .named("measure")
            .with_recorder(recorder.clone())
            .execute()
            .await
            .unwrap();

        assert_eq!(
            recorder.events_for("measure"),
            vec![
                AttemptEvent::Started { attempt: 1, max_attempts: 3 },
                AttemptEvent::Succeeded { attempt: 1 },
            ]
        );
    }
}

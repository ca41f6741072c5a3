//! Decorator form: bind a callable to a fixed policy once, call it many times

use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use super::error::RetryError;
use super::executor::{self, RetryHooks};
use super::kind::Classify;
use super::policy::RetryPolicy;
use super::recorder::AttemptRecorder;
use super::sleeper::Sleeper;

/// A callable wrapped with a retry policy.
///
/// `call(args)` takes the same argument value the wrapped callable takes
/// (a tuple for several arguments, `()` for none) and returns its success
/// value. Arguments are cloned for every attempt.
pub struct Retrying<F, E> {
    name: String,
    policy: RetryPolicy,
    hooks: RetryHooks<E>,
    op: F,
}

impl<F, E> Retrying<F, E> {
    pub fn new(policy: RetryPolicy, op: F) -> Self {
        Self {
            name: RetryPolicy::DEFAULT_OPERATION.to_string(),
            policy,
            hooks: RetryHooks::default(),
            op,
        }
    }

    /// Name used in attempt events and error messages
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
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

    pub fn on_retry<C>(mut self, callback: C) -> Self
    where
        C: Fn(u32, &E) + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_retry(callback);
        self
    }

    /// Replace every hook at once
    pub fn with_hooks(mut self, hooks: RetryHooks<E>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke the wrapped callable under the policy
    pub async fn call<A, T, Fut>(&self, args: A) -> Result<T, RetryError<E>>
    where
        F: Fn(A) -> Fut,
        A: Clone,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Classify + 'static,
    {
        executor::run(&self.name, &self.policy, &self.hooks, || (self.op)(args.clone())).await
    }
}

impl<F, E> fmt::Debug for Retrying<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl RetryPolicy {
    /// Wrap `op` with this policy
    pub fn decorate<F, E>(&self, op: F) -> Retrying<F, E> {
        Retrying::new(self.clone(), op)
    }
}

/// Build a policy and hand back a decorator factory in one step.
/// Fails here, before any callable is wrapped, if the policy is invalid.
pub fn retry(
    max_attempts: u32,
    delay: std::time::Duration,
    backoff: f64,
) -> Result<RetryPolicy, super::policy::PolicyError> {
    RetryPolicy::new(max_attempts, delay, backoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::{FailureKind, RecordingSleeper};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, thiserror::Error)]
    #[error("flaky: {0}")]
    struct Flaky(FailureKind);

    impl Classify for Flaky {
        fn kind(&self) -> FailureKind {
            self.0
        }
    }

    #[tokio::test]
    async fn test_decorated_callable_takes_arguments() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let add = move |(a, b): (u32, u32)| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Flaky(FailureKind::Timeout))
                } else {
                    Ok(a + b)
                }
            }
        };

        let policy = RetryPolicy::new(3, Duration::from_millis(5), 1.0).unwrap();
        let retrying = policy.decorate(add).with_sleeper(RecordingSleeper::new());

        assert_eq!(retrying.call((2, 3)).await.unwrap(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_decorator_is_reusable() {
        let policy = retry(2, Duration::ZERO, 1.0).unwrap();
        let double = policy
            .decorate(|x: u32| async move { Ok::<_, Flaky>(x * 2) })
            .named("double");

        assert_eq!(double.call(2).await.unwrap(), 4);
        assert_eq!(double.call(21).await.unwrap(), 42);
        assert_eq!(double.name(), "double");
    }

    #[test]
    fn test_invalid_decorator_policy_fails_before_wrapping() {
        assert!(retry(0, Duration::ZERO, 1.0).is_err());
    }
}

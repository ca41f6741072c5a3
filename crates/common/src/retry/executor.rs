//! The retry loop shared by the decorator and the fluent builder

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::error::RetryError;
use super::kind::Classify;
use super::policy::RetryPolicy;
use super::recorder::{AttemptEvent, AttemptRecorder, TracingRecorder};
use super::sleeper::{Sleeper, TokioSleeper};

/// Callback fired after a retryable failure, before the wait
pub type OnRetry<E> = Arc<dyn Fn(u32, &E) + Send + Sync>;

/// Side channels of a retry sequence: how to wait, where to report,
/// when to give up early
pub struct RetryHooks<E> {
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) recorder: Arc<dyn AttemptRecorder>,
    pub(crate) cancel: Option<CancellationToken>,
    pub(crate) on_retry: Option<OnRetry<E>>,
}

impl<E> RetryHooks<E> {
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Arc::new(sleeper);
        self
    }

    pub fn with_recorder(mut self, recorder: impl AttemptRecorder + 'static) -> Self {
        self.recorder = Arc::new(recorder);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(u32, &E) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(callback));
        self
    }
}

impl<E> Default for RetryHooks<E> {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
            recorder: Arc::new(TracingRecorder),
            cancel: None,
            on_retry: None,
        }
    }
}

impl<E> Clone for RetryHooks<E> {
    fn clone(&self) -> Self {
        Self {
            sleeper: Arc::clone(&self.sleeper),
            recorder: Arc::clone(&self.recorder),
            cancel: self.cancel.clone(),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E> fmt::Debug for RetryHooks<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryHooks")
            .field("sleeper", &"<sleeper>")
            .field("recorder", &"<recorder>")
            .field("cancel", &self.cancel.is_some())
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

/// Run `op` under `policy` until it succeeds, fails with a non-retryable
/// kind, runs out of attempts or is cancelled during a wait.
pub(crate) async fn run<T, E, F, Fut>(
    operation: &str,
    policy: &RetryPolicy,
    hooks: &RetryHooks<E>,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: std::error::Error + Classify + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts();
    let mut waited = Duration::ZERO;
    let mut attempt = 1;

    loop {
        hooks.recorder.record(operation, &AttemptEvent::Started { attempt, max_attempts });

        let error = match op().await {
            Ok(value) => {
                hooks.recorder.record(operation, &AttemptEvent::Succeeded { attempt });
                return Ok(value);
            }
            Err(e) => e,
        };

        let kind = error.kind();
        if !policy.is_retryable(kind) {
            hooks.recorder.record(
                operation,
                &AttemptEvent::Rejected { attempt, kind, error: error.to_string() },
            );
            return Err(RetryError::NonRetryable {
                operation: operation.to_string(),
                attempt,
                kind,
                source: error,
            });
        }

        hooks.recorder.record(
            operation,
            &AttemptEvent::Failed { attempt, kind, error: error.to_string() },
        );

        if attempt >= max_attempts {
            hooks.recorder.record(operation, &AttemptEvent::Exhausted { attempts: attempt });
            return Err(RetryError::Exhausted {
                operation: operation.to_string(),
                attempts: attempt,
                waited,
                source: error,
            });
        }

        if let Some(callback) = &hooks.on_retry {
            callback(attempt, &error);
        }

        let delay = policy.delay_after(attempt);
        hooks.recorder.record(operation, &AttemptEvent::Waiting { attempt, delay });

        match &hooks.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        hooks.recorder.record(operation, &AttemptEvent::Cancelled { attempts: attempt });
                        return Err(RetryError::Cancelled {
                            operation: operation.to_string(),
                            attempts: attempt,
                            last: Some(error),
                        });
                    }
                    _ = hooks.sleeper.sleep(delay) => {}
                }
            }
            None => hooks.sleeper.sleep(delay).await,
        }

        waited = waited.saturating_add(delay);
        attempt += 1;
    }
}

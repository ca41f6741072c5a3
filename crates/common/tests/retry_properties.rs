//! Behaviour of the retry executor across both surfaces

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use playbill_common::retry::{
    with_retry, AttemptEvent, Classify, CollectingRecorder, FailureKind, RecordingSleeper,
    RetryError, RetryPolicy,
};
use test_case::test_case;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} on call {call}")]
struct OpError {
    kind: FailureKind,
    call: u32,
}

impl Classify for OpError {
    fn kind(&self) -> FailureKind {
        self.kind
    }
}

/// An operation that fails with `kind` until call number `succeed_on`
/// (never, if `None`), counting its invocations.
#[derive(Clone)]
struct Script {
    calls: Arc<AtomicU32>,
    kind: FailureKind,
    succeed_on: Option<u32>,
}

impl Script {
    fn failing(kind: FailureKind) -> Self {
        Self { calls: Arc::new(AtomicU32::new(0)), kind, succeed_on: None }
    }

    fn succeeding_on(kind: FailureKind, call: u32) -> Self {
        Self { calls: Arc::new(AtomicU32::new(0)), kind, succeed_on: Some(call) }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn op(&self) -> impl Fn(()) -> std::future::Ready<Result<u32, OpError>> {
        let script = self.clone();
        move |()| {
            let call = script.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let result = match script.succeed_on {
                Some(n) if call >= n => Ok(call),
                _ => Err(OpError { kind: script.kind, call }),
            };
            std::future::ready(result)
        }
    }
}

#[test_case(1 ; "single attempt")]
#[test_case(3 ; "three attempts")]
#[test_case(7 ; "seven attempts")]
#[tokio::test]
async fn always_failing_operation_runs_exactly_max_attempts(n: u32) {
    let script = Script::failing(FailureKind::Timeout);
    let policy = RetryPolicy::new(n, Duration::from_millis(10), 2.0).unwrap();

    let err = policy
        .decorate(script.op())
        .with_sleeper(RecordingSleeper::new())
        .call(())
        .await
        .unwrap_err();

    assert_eq!(script.calls(), n);
    match err {
        RetryError::Exhausted { attempts, source, .. } => {
            assert_eq!(attempts, n);
            assert_eq!(source.call, n, "carries the last failure");
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[test_case(1 ; "first try")]
#[test_case(2 ; "second try")]
#[test_case(5 ; "last try")]
#[tokio::test]
async fn success_on_kth_attempt_stops_retrying(k: u32) {
    let script = Script::succeeding_on(FailureKind::Connection, k);
    let sleeper = RecordingSleeper::new();

    let value = with_retry(script.op(), ())
        .with_max_attempts(5)
        .with_delay(Duration::from_millis(1))
        .with_sleeper(sleeper.clone())
        .execute()
        .await
        .unwrap();

    assert_eq!(value, k);
    assert_eq!(script.calls(), k);
    assert_eq!(sleeper.slept().len() as u32, k - 1);
}

#[tokio::test]
async fn non_retryable_kind_fails_on_first_attempt() {
    let script = Script::failing(FailureKind::Assertion);
    let sleeper = RecordingSleeper::new();

    let err = with_retry(script.op(), ())
        .with_max_attempts(10)
        .on_kinds([FailureKind::Timeout, FailureKind::Connection])
        .with_sleeper(sleeper.clone())
        .execute()
        .await
        .unwrap_err();

    assert_eq!(script.calls(), 1);
    assert!(err.is_non_retryable());
    assert_eq!(err.attempts(), 1);
    assert!(sleeper.slept().is_empty());
}

#[tokio::test]
async fn matching_kind_is_retried_under_filter() {
    let script = Script::succeeding_on(FailureKind::Timeout, 3);

    let value = with_retry(script.op(), ())
        .on_kinds([FailureKind::Timeout])
        .with_sleeper(RecordingSleeper::new())
        .execute()
        .await
        .unwrap();

    assert_eq!(value, 3);
}

#[tokio::test]
async fn waits_grow_geometrically() {
    let script = Script::failing(FailureKind::Timeout);
    let sleeper = RecordingSleeper::new();

    let err = with_retry(script.op(), ())
        .with_max_attempts(5)
        .with_delay(Duration::from_millis(10))
        .with_backoff(3.0)
        .with_sleeper(sleeper.clone())
        .execute()
        .await
        .unwrap_err();

    let expected = vec![
        Duration::from_millis(10),
        Duration::from_millis(30),
        Duration::from_millis(90),
        Duration::from_millis(270),
    ];
    assert_eq!(sleeper.slept(), expected);

    match err {
        RetryError::Exhausted { waited, .. } => assert_eq!(waited, Duration::from_millis(400)),
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_policy_never_invokes_operation() {
    let script = Script::failing(FailureKind::Timeout);

    let err = with_retry(script.op(), ())
        .with_max_attempts(0)
        .execute()
        .await
        .unwrap_err();

    assert!(matches!(err, RetryError::Policy(_)));
    assert_eq!(err.attempts(), 0);
    assert_eq!(script.calls(), 0);

    let err = with_retry(script.op(), ()).with_backoff(-1.0).execute().await.unwrap_err();
    assert!(matches!(err, RetryError::Policy(_)));
    assert_eq!(script.calls(), 0);
}

#[test_case(Some(3), 4 ; "eventual success")]
#[test_case(None, 4 ; "exhaustion")]
#[tokio::test]
async fn decorator_and_builder_agree(succeed_on: Option<u32>, max_attempts: u32) {
    let make = || match succeed_on {
        Some(k) => Script::succeeding_on(FailureKind::Connection, k),
        None => Script::failing(FailureKind::Connection),
    };

    let decorated = make();
    let decorated_sleeper = RecordingSleeper::new();
    let decorated_result = RetryPolicy::new(max_attempts, Duration::from_millis(5), 2.0)
        .unwrap()
        .decorate(decorated.op())
        .with_sleeper(decorated_sleeper.clone())
        .call(())
        .await;

    let built = make();
    let built_sleeper = RecordingSleeper::new();
    let built_result = with_retry(built.op(), ())
        .with_max_attempts(max_attempts)
        .with_delay(Duration::from_millis(5))
        .with_backoff(2.0)
        .with_sleeper(built_sleeper.clone())
        .execute()
        .await;

    assert_eq!(decorated.calls(), built.calls());
    assert_eq!(decorated_sleeper.slept(), built_sleeper.slept());
    match (decorated_result, built_result) {
        (Ok(a), Ok(b)) => assert_eq!(a, b),
        (Err(a), Err(b)) => {
            assert_eq!(a.attempts(), b.attempts());
            assert_eq!(a.last_error(), b.last_error());
            assert_eq!(a.to_string(), b.to_string());
        }
        (a, b) => panic!("surfaces disagree: {a:?} vs {b:?}"),
    }
}

#[tokio::test]
async fn recorder_sees_every_step() {
    let script = Script::succeeding_on(FailureKind::Timeout, 2);
    let recorder = CollectingRecorder::new();

    with_retry(script.op(), ())
        .named("open dashboard")
        .with_max_attempts(2)
        .with_delay(Duration::from_millis(20))
        .with_sleeper(RecordingSleeper::new())
        .with_recorder(recorder.clone())
        .execute()
        .await
        .unwrap();

    assert_eq!(
        recorder.events_for("open dashboard"),
        vec![
            AttemptEvent::Started { attempt: 1, max_attempts: 2 },
            AttemptEvent::Failed {
                attempt: 1,
                kind: FailureKind::Timeout,
                error: "timeout on call 1".to_string(),
            },
            AttemptEvent::Waiting { attempt: 1, delay: Duration::from_millis(20) },
            AttemptEvent::Started { attempt: 2, max_attempts: 2 },
            AttemptEvent::Succeeded { attempt: 2 },
        ]
    );
}

#[tokio::test]
async fn cancellation_during_wait_aborts_retrying() {
    let script = Script::failing(FailureKind::Connection);
    let token = CancellationToken::new();
    let trigger = token.clone();

    let err = with_retry(script.op(), ())
        .with_max_attempts(5)
        .with_sleeper(RecordingSleeper::new())
        .with_cancellation(token)
        .on_retry(move |_, _| trigger.cancel())
        .execute()
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.attempts(), 1);
    assert_eq!(script.calls(), 1);
    assert_eq!(err.last_error().map(|e| e.call), Some(1));
}

#[tokio::test]
async fn cancellation_interrupts_a_real_sleep() {
    let script = Script::failing(FailureKind::Timeout);
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = with_retry(script.op(), ())
        .with_max_attempts(3)
        .with_delay(Duration::from_secs(60))
        .with_cancellation(token)
        .execute()
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(start.elapsed() < Duration::from_secs(30));
}

#[tokio::test]
async fn concurrent_invocations_do_not_interfere() {
    let policy = RetryPolicy::new(4, Duration::from_millis(1), 1.0).unwrap();

    let handles: Vec<_> = (1..=4)
        .map(|k| {
            let policy = policy.clone();
            tokio::spawn(async move {
                let script = Script::succeeding_on(FailureKind::Timeout, k);
                let result = policy
                    .decorate(script.op())
                    .with_sleeper(RecordingSleeper::new())
                    .call(())
                    .await;
                (k, script.calls(), result.map_err(|e| e.attempts()))
            })
        })
        .collect();

    for handle in handles {
        let (k, calls, result) = handle.await.unwrap();
        assert_eq!(calls, k);
        assert_eq!(result, Ok(k));
    }
}

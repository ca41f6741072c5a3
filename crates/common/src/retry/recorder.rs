//! Attempt events
//!
//! Observability is injected: the executor reports every step of a retry
//! sequence to an [`AttemptRecorder`]. [`TracingRecorder`] is the default.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::kind::FailureKind;

/// One step of a retry sequence
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptEvent {
    Started { attempt: u32, max_attempts: u32 },
    Succeeded { attempt: u32 },
    Failed { attempt: u32, kind: FailureKind, error: String },
    /// The failure kind is outside the retryable set
    Rejected { attempt: u32, kind: FailureKind, error: String },
    Waiting { attempt: u32, delay: Duration },
    Exhausted { attempts: u32 },
    Cancelled { attempts: u32 },
}

pub trait AttemptRecorder: Send + Sync {
    fn record(&self, operation: &str, event: &AttemptEvent);
}

/// Emits each event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl AttemptRecorder for TracingRecorder {
    fn record(&self, operation: &str, event: &AttemptEvent) {
        match event {
            AttemptEvent::Started { attempt, max_attempts } => {
                debug!("Attempting {} (attempt {}/{})", operation, attempt, max_attempts);
            }
            AttemptEvent::Succeeded { attempt } if *attempt > 1 => {
                info!("{} succeeded on attempt {}", operation, attempt);
            }
            AttemptEvent::Succeeded { .. } => {}
            AttemptEvent::Failed { attempt, error, .. } => {
                warn!("{} failed on attempt {}: {}", operation, attempt, error);
            }
            AttemptEvent::Rejected { attempt, kind, error } => {
                warn!(
                    "{} failed on attempt {} with non-retryable {} error: {}",
                    operation, attempt, kind, error
                );
            }
            AttemptEvent::Waiting { delay, .. } => {
                debug!("Waiting {:.2} seconds before retry", delay.as_secs_f64());
            }
            AttemptEvent::Exhausted { attempts } => {
                error!("{} failed after {} attempts", operation, attempts);
            }
            AttemptEvent::Cancelled { attempts } => {
                warn!("{} cancelled after {} attempts", operation, attempts);
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl AttemptRecorder for NoopRecorder {
    fn record(&self, _operation: &str, _event: &AttemptEvent) {}
}

/// Keeps every event in memory; clones share the same buffer
#[derive(Debug, Clone, Default)]
pub struct CollectingRecorder {
    events: Arc<Mutex<Vec<(String, AttemptEvent)>>>,
}

impl CollectingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AttemptEvent> {
        self.events.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    /// Events recorded for one named operation
    pub fn events_for(&self, operation: &str) -> Vec<AttemptEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

impl AttemptRecorder for CollectingRecorder {
    fn record(&self, operation: &str, event: &AttemptEvent) {
        self.events.lock().push((operation.to_string(), event.clone()));
    }
}

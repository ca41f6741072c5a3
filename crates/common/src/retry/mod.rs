//! Retry executor.
//!
//! # Data Flow
//! ```text
//! Retrying::call(args) / RetryBuilder::execute()
//!     → executor::run (single loop for both surfaces)
//!         → op() ──ok──→ value
//!         → err: kind outside policy set → NonRetryable
//!         → err: last attempt            → Exhausted
//!         → err: otherwise → on_retry → Sleeper::sleep(delay) (or cancel) → op()
//! ```
//!
//! Each invocation owns its policy and attempt counter; concurrent
//! invocations share nothing mutable. Waits suspend the task, they never
//! block the thread.

pub mod builder;
pub mod decorator;
pub mod error;
pub mod executor;
pub mod kind;
pub mod policy;
pub mod recorder;
pub mod sleeper;

pub use builder::{with_retry, RetryBuilder};
pub use decorator::{retry, Retrying};
pub use error::RetryError;
pub use executor::RetryHooks;
pub use kind::{Classify, FailureKind};
pub use policy::{PolicyError, RetryPolicy};
pub use recorder::{AttemptEvent, AttemptRecorder, CollectingRecorder, NoopRecorder, TracingRecorder};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};

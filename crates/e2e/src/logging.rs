//! Logging setup and test-result events
//!
//! Four sinks, each with its own filter:
//! - console: `RUST_LOG`, else `LOG_LEVEL`, else `info`
//! - `test_automation.log`: everything at DEBUG and above
//! - `errors.log`: ERROR only
//! - `test_results.log`: events on the [`RESULT_TARGET`] target

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::error::{E2eError, E2eResult};

/// Target carried by test lifecycle events
pub const RESULT_TARGET: &str = "test_result";

fn open_log(dir: &Path, name: &str) -> E2eResult<Mutex<File>> {
    let file = OpenOptions::new().create(true).append(true).open(dir.join(name))?;
    Ok(Mutex::new(file))
}

fn console_filter() -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    match std::env::var("LOG_LEVEL") {
        Ok(level) => EnvFilter::try_new(level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info")),
        Err(_) => EnvFilter::new("info"),
    }
}

/// Build the subscriber without installing it
pub fn subscriber(logs_dir: &Path) -> E2eResult<impl tracing::Subscriber + Send + Sync + 'static> {
    std::fs::create_dir_all(logs_dir)?;

    let all = open_log(logs_dir, "test_automation.log")?;
    let errors = open_log(logs_dir, "errors.log")?;
    let results = open_log(logs_dir, "test_results.log")?;

    Ok(tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_filter(console_filter()))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(all)
                .with_filter(LevelFilter::DEBUG),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(errors)
                .with_filter(LevelFilter::ERROR),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_level(false)
                .with_writer(results)
                .with_filter(Targets::new().with_target(RESULT_TARGET, Level::TRACE)),
        ))
}

/// Install the subscriber for the whole process
pub fn init(logs_dir: &Path) -> E2eResult<()> {
    subscriber(logs_dir)?
        .try_init()
        .map_err(|e| E2eError::Logging(e.to_string()))
}

pub fn test_started(name: &str, description: &str) {
    info!(target: RESULT_TARGET, "TEST STARTED: {} - {}", name, description);
}

pub fn test_passed(name: &str, duration: Duration) {
    info!(target: RESULT_TARGET, "TEST PASSED: {} (Duration: {:.2}s)", name, duration.as_secs_f64());
}

pub fn test_failed(name: &str, message: &str, duration: Duration) {
    error!(
        target: RESULT_TARGET,
        "TEST FAILED: {} (Duration: {:.2}s) - {}",
        name,
        duration.as_secs_f64(),
        message
    );
}

pub fn test_skipped(name: &str, reason: &str) {
    warn!(target: RESULT_TARGET, "TEST SKIPPED: {} - {}", name, reason);
}

pub fn step(description: &str) {
    info!("STEP: {}", description);
}

fn action_message(action: &str, target: &str, details: &str) -> String {
    let mut message = format!("ACTION: {}", action);
    if !target.is_empty() {
        message.push_str(&format!(" on '{}'", target));
    }
    if !details.is_empty() {
        message.push_str(&format!(" - {}", details));
    }
    message
}

pub fn action(action: &str, target: &str, details: &str) {
    debug!("{}", action_message(action, target, details));
}

fn assertion_message(assertion: &str, passed: bool, expected: &str, actual: &str) -> String {
    let status = if passed { "PASSED" } else { "FAILED" };
    let mut message = format!("ASSERTION {}: {}", status, assertion);
    if !expected.is_empty() && !actual.is_empty() {
        message.push_str(&format!(" (Expected: {}, Actual: {})", expected, actual));
    }
    message
}

pub fn assertion(assertion: &str, passed: bool, expected: &str, actual: &str) {
    let message = assertion_message(assertion, passed, expected, actual);
    if passed {
        debug!("{}", message);
    } else {
        error!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_message() {
        assert_eq!(action_message("Click", "#submit", ""), "ACTION: Click on '#submit'");
        assert_eq!(
            action_message("Type", "#username", "clearing first"),
            "ACTION: Type on '#username' - clearing first"
        );
        assert_eq!(action_message("Reload", "", ""), "ACTION: Reload");
    }

    #[test]
    fn test_assertion_message() {
        assert_eq!(
            assertion_message("url matches", false, "/ok/", "/login/"),
            "ASSERTION FAILED: url matches (Expected: /ok/, Actual: /login/)"
        );
        assert_eq!(assertion_message("form shown", true, "", "x"), "ASSERTION PASSED: form shown");
    }

    #[test]
    fn test_sinks_split_by_level_and_target() {
        let dir = tempfile::tempdir().unwrap();
        let subscriber = subscriber(dir.path()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            test_passed("login_works", Duration::from_millis(1500));
            step("Open login page");
            action("Click", "#submit", "");
            error!("browser crashed");
        });

        let read = |name: &str| std::fs::read_to_string(dir.path().join(name)).unwrap();

        let results = read("test_results.log");
        assert!(results.contains("TEST PASSED: login_works (Duration: 1.50s)"));
        assert!(!results.contains("STEP"));

        let errors = read("errors.log");
        assert!(errors.contains("browser crashed"));
        assert!(!errors.contains("TEST PASSED"));

        let all = read("test_automation.log");
        assert!(all.contains("ACTION: Click on '#submit'"));
        assert!(all.contains("STEP: Open login page"));
    }
}

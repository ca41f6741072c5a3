//! Scenario runner: filters, runs and reruns scenarios, collects results

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use tracing::{error, info, warn};

use playbill_common::retry::{AttemptRecorder, RetryHooks, RetryPolicy, Sleeper};
use playbill_common::settings::ScreenshotMode;
use playbill_common::Settings;

use crate::error::{E2eError, E2eResult};
use crate::logging;
use crate::screenplay::{Actor, BrowseTheWeb};
use crate::screenshot::ScreenshotManager;

/// A named piece of end-to-end behaviour, performed by an actor
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    /// Skip when the `CI` environment variable is set
    fn skip_in_ci(&self) -> bool {
        false
    }

    async fn run(&self, actor: Actor) -> E2eResult<()>;
}

/// A scenario built from an async closure
pub struct FnScenario<F, Fut> {
    name: String,
    description: String,
    tags: Vec<String>,
    skip_in_ci: bool,
    run: F,
    _fut: PhantomData<fn() -> Fut>,
}

/// Build a scenario from `run`, which receives its own copy of the actor
pub fn scenario<F, Fut>(name: impl Into<String>, run: F) -> FnScenario<F, Fut>
where
    F: Fn(Actor) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = E2eResult<()>> + Send + 'static,
{
    FnScenario {
        name: name.into(),
        description: String::new(),
        tags: Vec::new(),
        skip_in_ci: false,
        run,
        _fut: PhantomData,
    }
}

impl<F, Fut> FnScenario<F, Fut> {
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn skip_in_ci(mut self) -> Self {
        self.skip_in_ci = true;
        self
    }
}

#[async_trait]
impl<F, Fut> Scenario for FnScenario<F, Fut>
where
    F: Fn(Actor) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = E2eResult<()>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn skip_in_ci(&self) -> bool {
        self.skip_in_ci
    }

    async fn run(&self, actor: Actor) -> E2eResult<()> {
        (self.run)(actor).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// Runs it took, reruns included; zero when skipped
    pub attempts: u32,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs scenarios against one actor template
pub struct Stage {
    settings: Settings,
    actor: Actor,
    scenarios: Vec<Box<dyn Scenario>>,
    tags: Vec<String>,
    screenshots: Option<ScreenshotManager>,
    rerun_policy: RetryPolicy,
    hooks: RetryHooks<E2eError>,
    in_ci: bool,
}

impl Stage {
    /// Reruns follow `settings.test.retry_count`; CI detection reads `CI`
    pub fn new(settings: Settings, actor: Actor) -> Self {
        let rerun_policy = settings.test.retry_policy();
        Self {
            settings,
            actor,
            scenarios: Vec::new(),
            tags: Vec::new(),
            screenshots: None,
            rerun_policy,
            hooks: RetryHooks::default(),
            in_ci: std::env::var_os("CI").is_some(),
        }
    }

    pub fn with_scenario(mut self, scenario: impl Scenario + 'static) -> Self {
        self.scenarios.push(Box::new(scenario));
        self
    }

    /// Only run scenarios carrying at least one of the given tags
    pub fn only_tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_screenshots(mut self, manager: ScreenshotManager) -> Self {
        self.screenshots = Some(manager);
        self
    }

    pub fn with_rerun_policy(mut self, policy: RetryPolicy) -> Self {
        self.rerun_policy = policy;
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

    pub fn in_ci(mut self, in_ci: bool) -> Self {
        self.in_ci = in_ci;
        self
    }

    fn selected(&self, scenario: &dyn Scenario) -> bool {
        self.tags.is_empty() || scenario.tags().iter().any(|t| self.tags.contains(t))
    }

    /// Run every selected scenario in registration order
    pub async fn run(&self) -> SuiteResult {
        let start = Instant::now();
        let selected: Vec<&dyn Scenario> = self
            .scenarios
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| self.selected(*s))
            .collect();

        info!("Running {} test(s)...", selected.len());

        let mut results = Vec::with_capacity(selected.len());
        for scenario in selected {
            results.push(self.run_scenario(scenario).await);
        }

        let count = |outcome: Outcome| results.iter().filter(|r| r.outcome == outcome).count();
        let (passed, failed, skipped) =
            (count(Outcome::Passed), count(Outcome::Failed), count(Outcome::Skipped));
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        SuiteResult {
            total: results.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    /// Run one scenario, rerunning it under the stage's policy
    pub async fn run_scenario(&self, scenario: &dyn Scenario) -> ScenarioResult {
        let name = scenario.name().to_string();

        if scenario.skip_in_ci() && self.in_ci {
            logging::test_skipped(&name, "Skipped in CI environment");
            return ScenarioResult {
                name,
                outcome: Outcome::Skipped,
                duration_ms: 0,
                attempts: 0,
                error: None,
                screenshot: None,
            };
        }

        logging::test_started(&name, scenario.description());
        let start = Instant::now();
        let attempts = AtomicU32::new(0);

        let result = self
            .rerun_policy
            .decorate(|()| {
                attempts.fetch_add(1, Ordering::SeqCst);
                scenario.run(self.actor.clone())
            })
            .named(name.clone())
            .with_hooks(self.hooks.clone())
            .call(())
            .await;

        let elapsed = start.elapsed();
        let attempts = attempts.into_inner();

        match result {
            Ok(()) => {
                logging::test_passed(&name, elapsed);
                info!("✓ {} ({} ms)", name, elapsed.as_millis());
                ScenarioResult {
                    name,
                    outcome: Outcome::Passed,
                    duration_ms: elapsed.as_millis() as u64,
                    attempts,
                    error: None,
                    screenshot: None,
                }
            }
            Err(err) => {
                let message = err
                    .last_error()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| err.to_string());
                logging::test_failed(&name, &message, elapsed);
                error!("✗ {} - {}", name, message);

                let screenshot = self.failure_screenshot(&name, &message).await;
                ScenarioResult {
                    name,
                    outcome: Outcome::Failed,
                    duration_ms: elapsed.as_millis() as u64,
                    attempts,
                    error: Some(message),
                    screenshot,
                }
            }
        }
    }

    async fn failure_screenshot(&self, name: &str, message: &str) -> Option<PathBuf> {
        if self.settings.browser.screenshot == ScreenshotMode::Off {
            return None;
        }
        let manager = self.screenshots.as_ref()?;
        match self.actor.ability_to::<BrowseTheWeb>() {
            Ok(browse) => manager.take_failure_screenshot(browse.page(), name, message).await,
            Err(_) => {
                warn!("{} cannot browse; no failure screenshot for {}", self.actor, name);
                None
            }
        }
    }

    /// Write results as `test-results.json` under the reports directory
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        let dir = &self.settings.test.reports_path;
        std::fs::create_dir_all(dir)?;

        let path = dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakePage;
    use playbill_common::retry::RecordingSleeper;
    use std::future::{ready, Ready};
    use std::sync::Arc;

    fn stage(settings: Settings) -> Stage {
        let actor = Actor::new("Runner").who_can(BrowseTheWeb::with_page(FakePage::new()));
        Stage::new(settings, actor)
            .with_sleeper(RecordingSleeper::new())
            .in_ci(false)
    }

    type Done = Ready<E2eResult<()>>;
    type Canned = FnScenario<fn(Actor) -> Done, Done>;

    fn pass(_actor: Actor) -> Done {
        ready(Ok(()))
    }

    fn fail(_actor: Actor) -> Done {
        ready(Err(E2eError::AssertionFailed("expected the dashboard".to_string())))
    }

    fn passing(name: &str) -> Canned {
        scenario(name.to_string(), pass as fn(Actor) -> Done)
    }

    fn failing(name: &str) -> Canned {
        scenario(name.to_string(), fail as fn(Actor) -> Done)
    }

    #[tokio::test]
    async fn test_counts_outcomes() {
        let suite = stage(Settings::default())
            .with_scenario(passing("a"))
            .with_scenario(failing("b"))
            .with_scenario(passing("c").skip_in_ci())
            .in_ci(true)
            .run()
            .await;

        assert_eq!((suite.total, suite.passed, suite.failed, suite.skipped), (3, 1, 1, 1));
        assert!(!suite.success());
        assert_eq!(suite.results[1].error.as_deref(), Some("Assertion failed: expected the dashboard"));
    }

    #[tokio::test]
    async fn test_failed_scenarios_are_rerun() {
        let mut settings = Settings::default();
        settings.test.retry_count = 2;

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let flaky = scenario("flaky", move |_actor| {
            let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if call < 3 {
                    Err(E2eError::Timeout("#submit".to_string()))
                } else {
                    Ok(())
                }
            }
        });

        let suite = stage(settings).with_scenario(flaky).run().await;

        assert_eq!(suite.passed, 1);
        assert_eq!(suite.results[0].attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_tag_filter_excludes_untagged() {
        let suite = stage(Settings::default())
            .with_scenario(passing("smoke").tagged("smoke"))
            .with_scenario(passing("regression").tagged("regression"))
            .with_scenario(passing("untagged"))
            .only_tagged("smoke")
            .run()
            .await;

        assert_eq!(suite.total, 1);
        assert_eq!(suite.results[0].name, "smoke");
    }

    #[tokio::test]
    async fn test_failure_takes_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let suite = stage(Settings::default())
            .with_rerun_policy(RetryPolicy::no_retry())
            .with_screenshots(ScreenshotManager::new(dir.path()).unwrap())
            .with_scenario(failing("checkout"))
            .run()
            .await;

        let shot = suite.results[0].screenshot.clone().unwrap();
        assert!(shot.starts_with(dir.path().join("checkout")));
        assert!(shot.exists());
    }

    #[tokio::test]
    async fn test_screenshots_off_disables_failure_shots() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.browser.screenshot = ScreenshotMode::Off;

        let suite = stage(settings)
            .with_rerun_policy(RetryPolicy::no_retry())
            .with_screenshots(ScreenshotManager::new(dir.path()).unwrap())
            .with_scenario(failing("checkout"))
            .run()
            .await;

        assert!(suite.results[0].screenshot.is_none());
    }

    #[tokio::test]
    async fn test_write_results_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.test.reports_path = dir.path().join("reports");

        let stage = stage(settings).with_scenario(passing("a"));
        let suite = stage.run().await;
        let path = stage.write_results(&suite).unwrap();

        assert_eq!(path, dir.path().join("reports").join("test-results.json"));
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["passed"], 1);
        assert_eq!(json["results"][0]["outcome"], "passed");
    }
}

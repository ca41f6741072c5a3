//! Playwright browser automation
//!
//! Every browser round-trip is one generated Node script: launch, replay the
//! journal of page-changing actions that already succeeded, then run the new
//! action or read. The script prints a single JSON outcome line on stdout.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

use playbill_common::{BrowserKind, BrowserSettings};

use crate::error::{E2eError, E2eResult};
use crate::page::{Page, WaitState};

/// A page action recorded in the journal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    WaitFor { selector: String, state: WaitState },
    Click(String),
    Fill { selector: String, value: String },
    Type { selector: String, text: String },
}

impl Action {
    /// Waits are checked once and never replayed
    fn changes_page(&self) -> bool {
        !matches!(self, Action::WaitFor { .. })
    }

    fn to_js(&self) -> String {
        match self {
            Action::Goto(url) => {
                format!("    await page.goto({}, {{ waitUntil: 'networkidle' }});", js_str(url))
            }
            Action::WaitFor { selector, state } => format!(
                "    await page.waitForSelector({}, {{ state: '{}' }});",
                js_str(selector),
                state
            ),
            Action::Click(selector) => format!("    await page.click({});", js_str(selector)),
            Action::Fill { selector, value } => {
                format!("    await page.fill({}, {});", js_str(selector), js_str(value))
            }
            Action::Type { selector, text } => {
                format!("    await page.type({}, {});", js_str(selector), js_str(text))
            }
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Goto(url) => write!(f, "goto:{}", url),
            Action::WaitFor { selector, state } => write!(f, "wait:{}:{}", selector, state),
            Action::Click(selector) => write!(f, "click:{}", selector),
            Action::Fill { selector, .. } => write!(f, "fill:{}", selector),
            Action::Type { selector, .. } => write!(f, "type:{}", selector),
        }
    }
}

/// What the script reports back after replaying the journal
#[derive(Debug, Clone, PartialEq)]
pub enum Probe {
    Nothing,
    TextContent(String),
    IsVisible(String),
    Exists(String),
    Url,
    Title,
    Screenshot { path: PathBuf, full_page: bool },
}

impl Probe {
    fn to_js(&self) -> String {
        match self {
            Probe::Nothing => "    result = null;".to_string(),
            Probe::TextContent(selector) => {
                format!("    result = await page.textContent({});", js_str(selector))
            }
            Probe::IsVisible(selector) => {
                format!("    result = await page.isVisible({});", js_str(selector))
            }
            Probe::Exists(selector) => {
                format!("    result = (await page.$({})) !== null;", js_str(selector))
            }
            Probe::Url => "    result = page.url();".to_string(),
            Probe::Title => "    result = await page.title();".to_string(),
            Probe::Screenshot { path, full_page } => format!(
                "    await page.screenshot({{ path: {}, fullPage: {} }});",
                js_str(&path.to_string_lossy()),
                full_page
            ),
        }
    }
}

/// Quote a string as a JavaScript literal
fn js_str(s: &str) -> String {
    Value::from(s).to_string()
}

#[derive(Debug, Deserialize)]
struct ScriptOutcome {
    success: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: BrowserKind,
    pub headless: bool,
    pub slow_mo: u64,
    /// Default timeout for every page operation, in milliseconds
    pub timeout_ms: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Directory the `playwright` package is resolved from
    pub project_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self::from(&BrowserSettings::default())
    }
}

impl From<&BrowserSettings> for PlaywrightConfig {
    fn from(settings: &BrowserSettings) -> Self {
        Self {
            browser: settings.browser_name,
            headless: settings.headless,
            slow_mo: settings.slow_mo,
            timeout_ms: settings.timeout,
            viewport_width: settings.viewport_width,
            viewport_height: settings.viewport_height,
            project_dir: PathBuf::from("."),
        }
    }
}

/// [`Page`] backed by generated Playwright scripts
pub struct PlaywrightPage {
    config: PlaywrightConfig,
    journal: Mutex<Vec<Action>>,
}

impl PlaywrightPage {
    /// Create a page; nothing is launched until the first action
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config, journal: Mutex::new(Vec::new()) }
    }

    /// Create a page after checking that Playwright is installed
    pub async fn verified(config: PlaywrightConfig) -> E2eResult<Self> {
        let status = TokioCommand::new("npx")
            .args(["playwright", "--version"])
            .current_dir(&config.project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(Self::new(config)),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    /// Actions replayed at the start of every script
    pub fn journal(&self) -> Vec<Action> {
        self.journal.lock().clone()
    }

    /// Build the Playwright script for `actions` followed by `probe`
    pub fn build_script(&self, actions: &[Action], probe: &Probe) -> String {
        let mut script = String::new();

        // Header
        script.push_str(&format!(
            r#"
const {{ chromium, firefox, webkit }} = require(require.resolve('playwright', {{ paths: [process.cwd()] }}));

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless}, slowMo: {slow_mo} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  page.setDefaultTimeout({timeout});
  let result = null;

  try {{
"#,
            browser = self.config.browser.as_str(),
            headless = self.config.headless,
            slow_mo = self.config.slow_mo,
            width = self.config.viewport_width,
            height = self.config.viewport_height,
            timeout = self.config.timeout_ms,
        ));

        for (i, action) in actions.iter().enumerate() {
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, action));
            script.push_str(&action.to_js());
            script.push('\n');
        }

        script.push_str("\n    // Probe\n");
        script.push_str(&probe.to_js());

        // Footer
        script.push_str(
            r#"
    console.log(JSON.stringify({ success: true, result }));
  } catch (error) {
    console.log(JSON.stringify({ success: false, name: error.name, error: error.message }));
    process.exitCode = 1;
  } finally {
    await browser.close();
  }
})();
"#,
        );

        script
    }

    /// Execute a script with node and return its `result` value
    pub async fn run_script(&self, script: &str) -> E2eResult<Value> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("playbill.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = TokioCommand::new("node")
            .arg(&script_path)
            .current_dir(&self.config.project_dir)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => E2eError::PlaywrightNotFound,
                _ => E2eError::Io(e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_outcome(&stdout) {
            Some(outcome) => outcome_result(outcome),
            None => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(E2eError::Playwright(format!(
                    "Script failed:\nstdout: {}\nstderr: {}",
                    stdout, stderr
                )))
            }
        }
    }

    async fn perform(&self, action: Action) -> E2eResult<()> {
        let mut actions = self.journal();
        actions.push(action.clone());

        debug!("Performing {}", action);
        let script = self.build_script(&actions, &Probe::Nothing);
        self.run_script(&script).await?;

        if action.changes_page() {
            self.journal.lock().push(action);
        }
        Ok(())
    }

    async fn read(&self, probe: Probe) -> E2eResult<Value> {
        let script = self.build_script(&self.journal(), &probe);
        self.run_script(&script).await
    }
}

/// The last stdout line that parses as an outcome
fn parse_outcome(stdout: &str) -> Option<ScriptOutcome> {
    stdout
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<ScriptOutcome>(line.trim()).ok())
}

fn outcome_result(outcome: ScriptOutcome) -> E2eResult<Value> {
    if outcome.success {
        return Ok(outcome.result);
    }

    let message = outcome.error.unwrap_or_else(|| "unknown error".to_string());
    match outcome.name.as_deref() {
        Some("TimeoutError") => Err(E2eError::Timeout(message)),
        _ => {
            warn!("Playwright script failed: {}", message);
            Err(E2eError::Playwright(message))
        }
    }
}

fn expect_bool(value: Value) -> E2eResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| E2eError::Playwright(format!("expected a boolean, got {}", value)))
}

fn expect_string(value: Value) -> E2eResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(E2eError::Playwright(format!("expected a string, got {}", other))),
    }
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.perform(Action::Goto(url.to_string())).await
    }

    async fn wait_for_selector(&self, selector: &str, state: WaitState) -> E2eResult<()> {
        self.perform(Action::WaitFor { selector: selector.to_string(), state }).await
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.perform(Action::Click(selector.to_string())).await
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.perform(Action::Fill { selector: selector.to_string(), value: value.to_string() })
            .await
    }

    async fn type_text(&self, selector: &str, text: &str) -> E2eResult<()> {
        self.perform(Action::Type { selector: selector.to_string(), text: text.to_string() })
            .await
    }

    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>> {
        match self.read(Probe::TextContent(selector.to_string())).await? {
            Value::Null => Ok(None),
            other => expect_string(other).map(Some),
        }
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        expect_bool(self.read(Probe::IsVisible(selector.to_string())).await?)
    }

    async fn query_selector_exists(&self, selector: &str) -> E2eResult<bool> {
        expect_bool(self.read(Probe::Exists(selector.to_string())).await?)
    }

    async fn url(&self) -> E2eResult<String> {
        expect_string(self.read(Probe::Url).await?)
    }

    async fn title(&self) -> E2eResult<String> {
        expect_string(self.read(Probe::Title).await?)
    }

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()> {
        self.read(Probe::Screenshot { path: path.to_path_buf(), full_page }).await?;
        Ok(())
    }
}

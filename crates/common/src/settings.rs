//! Test-run settings read from environment variables
//!
//! Values come from the process environment (after loading `.env`), or
//! from any lookup function so tests can supply their own map. Settings
//! are passed around explicitly; nothing here is global.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

/// Browser engine to drive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "chromium" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" => Ok(BrowserKind::Webkit),
            other => Err(format!("unsupported browser {:?}", other)),
        }
    }
}

/// When screenshots are captured automatically
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMode {
    On,
    Off,
    #[default]
    OnlyOnFailure,
}

impl FromStr for ScreenshotMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "on" => Ok(ScreenshotMode::On),
            "off" => Ok(ScreenshotMode::Off),
            "only-on-failure" => Ok(ScreenshotMode::OnlyOnFailure),
            other => Err(format!("unknown screenshot mode {:?}", other)),
        }
    }
}

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserSettings {
    pub browser_name: BrowserKind,
    pub headless: bool,
    pub slow_mo: u64,
    /// Default timeout for page operations, in milliseconds
    pub timeout: u64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub video: bool,
    pub screenshot: ScreenshotMode,
    pub trace: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            browser_name: BrowserKind::Chromium,
            headless: true,
            slow_mo: 0,
            timeout: 30_000,
            viewport_width: 1920,
            viewport_height: 1080,
            video: false,
            screenshot: ScreenshotMode::OnlyOnFailure,
            trace: false,
        }
    }
}

impl BrowserSettings {
    fn from_env(env: &Env<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            browser_name: env.parse("BROWSER_NAME", defaults.browser_name)?,
            headless: env.flag("HEADLESS", defaults.headless),
            slow_mo: env.parse("SLOW_MO", defaults.slow_mo)?,
            timeout: env.parse("TIMEOUT", defaults.timeout)?,
            viewport_width: env.parse("VIEWPORT_WIDTH", defaults.viewport_width)?,
            viewport_height: env.parse("VIEWPORT_HEIGHT", defaults.viewport_height)?,
            video: env.flag("VIDEO", defaults.video),
            screenshot: env.parse("SCREENSHOT", defaults.screenshot)?,
            trace: env.flag("TRACE", defaults.trace),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

/// Target environment and its test accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSettings {
    pub environment: String,
    pub base_url: String,
    pub api_base_url: String,
    pub valid_username: String,
    pub valid_password: String,
    pub invalid_username: String,
    pub invalid_password: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            base_url: "https://practicetestautomation.com".to_string(),
            api_base_url: String::new(),
            valid_username: "student".to_string(),
            valid_password: "Password123".to_string(),
            invalid_username: "incorrectUser".to_string(),
            invalid_password: "incorrectPassword".to_string(),
        }
    }
}

impl EnvironmentSettings {
    fn from_env(env: &Env<'_>) -> Self {
        let defaults = Self::default();
        Self {
            environment: env.string("ENVIRONMENT", defaults.environment),
            base_url: env.string("BASE_URL", defaults.base_url),
            api_base_url: env.string("API_BASE_URL", defaults.api_base_url),
            valid_username: env.string("VALID_USERNAME", defaults.valid_username),
            valid_password: env.string("VALID_PASSWORD", defaults.valid_password),
            invalid_username: env.string("INVALID_USERNAME", defaults.invalid_username),
            invalid_password: env.string("INVALID_PASSWORD", defaults.invalid_password),
        }
    }
}

/// Test execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSettings {
    /// Extra attempts granted to a failing scenario
    pub retry_count: u32,
    pub parallel_workers: u32,
    pub test_data_path: PathBuf,
    pub reports_path: PathBuf,
    pub logs_path: PathBuf,
    pub screenshots_path: PathBuf,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            retry_count: 2,
            parallel_workers: 1,
            test_data_path: PathBuf::from("src/data"),
            reports_path: PathBuf::from("reports"),
            logs_path: PathBuf::from("logs"),
            screenshots_path: PathBuf::from("reports/screenshots"),
        }
    }
}

impl TestSettings {
    fn from_env(env: &Env<'_>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            retry_count: env.parse("RETRY_COUNT", defaults.retry_count)?,
            parallel_workers: env.parse("PARALLEL_WORKERS", defaults.parallel_workers)?,
            test_data_path: env.path("TEST_DATA_PATH", defaults.test_data_path),
            reports_path: env.path("REPORTS_PATH", defaults.reports_path),
            logs_path: env.path("LOGS_PATH", defaults.logs_path),
            screenshots_path: env.path("SCREENSHOTS_PATH", defaults.screenshots_path),
        })
    }

    /// Policy for re-running failed scenarios: one attempt plus `retry_count` retries
    pub fn retry_policy(&self) -> RetryPolicy {
        let attempts = self.retry_count.saturating_add(1);
        RetryPolicy::new(attempts, RetryPolicy::DEFAULT_DELAY, RetryPolicy::DEFAULT_BACKOFF)
            .unwrap_or_else(|_| RetryPolicy::no_retry())
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// What a browser launch needs, derived from [`BrowserSettings`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub browser: BrowserKind,
    pub headless: bool,
    pub slow_mo: u64,
    pub viewport: Viewport,
    pub video: bool,
    pub screenshot: ScreenshotMode,
    pub trace: bool,
}

/// Well-known pages of the application under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUrls {
    pub login: String,
    pub logged_in: String,
    pub home: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub valid: Credential,
    pub invalid: Credential,
}

/// All settings for a test run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub browser: BrowserSettings,
    pub environment: EnvironmentSettings,
    pub test: TestSettings,
}

impl Settings {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::InvalidConfig(format!(".env: {}", e))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup: &lookup };
        Ok(Self {
            browser: BrowserSettings::from_env(&env)?,
            environment: EnvironmentSettings::from_env(&env),
            test: TestSettings::from_env(&env)?,
        })
    }

    pub fn browser_config(&self) -> BrowserConfig {
        BrowserConfig {
            browser: self.browser.browser_name,
            headless: self.browser.headless,
            slow_mo: self.browser.slow_mo,
            viewport: Viewport {
                width: self.browser.viewport_width,
                height: self.browser.viewport_height,
            },
            video: self.browser.video,
            screenshot: self.browser.screenshot,
            trace: self.browser.trace,
        }
    }

    pub fn test_urls(&self) -> TestUrls {
        let base = self.environment.base_url.trim_end_matches('/');
        TestUrls {
            login: format!("{}/practice-test-login/", base),
            logged_in: format!("{}/logged-in-successfully/", base),
            home: self.environment.base_url.clone(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            valid: Credential {
                username: self.environment.valid_username.clone(),
                password: self.environment.valid_password.clone(),
            },
            invalid: Credential {
                username: self.environment.invalid_username.clone(),
                password: self.environment.invalid_password.clone(),
            },
        }
    }
}

/// Typed reads over a string lookup
struct Env<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Env<'_> {
    fn string(&self, key: &str, default: String) -> String {
        (self.lookup)(key).unwrap_or(default)
    }

    fn path(&self, key: &str, default: PathBuf) -> PathBuf {
        (self.lookup)(key).map(PathBuf::from).unwrap_or(default)
    }

    /// Only a case-insensitive "true" is true
    fn flag(&self, key: &str, default: bool) -> bool {
        match (self.lookup)(key) {
            Some(value) => value.trim().eq_ignore_ascii_case("true"),
            None => default,
        }
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(key) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e| Error::invalid_var(key, &value, e)),
            None => Ok(default),
        }
    }
}

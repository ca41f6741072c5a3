//! Builds and runs the `cargo test` invocation for a suite

use std::fmt;
use std::path::Path;
use std::process::ExitStatus;

use clap::ValueEnum;
use tokio::process::Command;
use tracing::info;

use playbill_common::BrowserKind;

/// Test-name filter selecting the smoke suite; smoke tests carry a `smoke_` prefix
pub const SMOKE_FILTER: &str = "smoke";

/// Which tests to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    #[default]
    All,
    Unit,
    Integration,
    E2e,
    Smoke,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suite::All => "all",
            Suite::Unit => "unit",
            Suite::Integration => "integration",
            Suite::E2e => "e2e",
            Suite::Smoke => "smoke",
        };
        f.write_str(name)
    }
}

/// Everything that shapes a test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub suite: Suite,
    pub browser: BrowserKind,
    pub headed: bool,
    pub parallel: u32,
    pub verbose: bool,
    pub debug: bool,
}

impl Launch {
    /// Variables exported to the test processes
    pub fn env(&self) -> Vec<(&'static str, String)> {
        let mut env = vec![
            ("BROWSER_NAME", self.browser.as_str().to_string()),
            ("HEADLESS", (!self.headed).to_string()),
        ];
        if self.debug {
            env.push(("LOG_LEVEL", "DEBUG".to_string()));
        }
        env
    }
}

/// Arguments passed to `cargo`, including the part after `--`
pub fn cargo_test_args(launch: &Launch) -> Vec<String> {
    let mut args: Vec<String> = vec!["test".into()];
    let mut harness: Vec<String> = Vec::new();

    match launch.suite {
        Suite::All => args.push("--workspace".into()),
        Suite::Unit => args.extend(["--workspace".into(), "--lib".into()]),
        Suite::Integration => args.extend(
            ["--workspace", "--test", "retry_properties", "--test", "screenplay"].map(String::from),
        ),
        Suite::E2e => {
            args.extend(["--package", "playbill-e2e", "--test", "login"].map(String::from));
            harness.push("--ignored".into());
        }
        Suite::Smoke => {
            args.push("--workspace".into());
            harness.push(SMOKE_FILTER.into());
        }
    }

    if launch.verbose {
        args.push("--verbose".into());
    }
    if launch.parallel > 1 {
        harness.extend(["--test-threads".into(), launch.parallel.to_string()]);
    }
    if launch.debug {
        harness.push("--nocapture".into());
    }

    if !harness.is_empty() {
        args.push("--".into());
        args.extend(harness);
    }
    args
}

/// Create the output directories the tests write into
pub fn prepare_dirs(root: &Path) -> std::io::Result<()> {
    for dir in ["reports", "logs"] {
        std::fs::create_dir_all(root.join(dir))?;
    }
    Ok(())
}

/// Run the suite and wait for it
pub async fn run(launch: &Launch) -> std::io::Result<ExitStatus> {
    let args = cargo_test_args(launch);
    info!("Running {} tests with {}", launch.suite, launch.browser.as_str());
    info!("Running: cargo {}", args.join(" "));

    Command::new("cargo").args(&args).envs(launch.env()).status().await
}

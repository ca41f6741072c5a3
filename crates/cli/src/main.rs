//! Playbill CLI - Main Entry Point
//!
//! Launches the unit, integration, end-to-end or smoke suites with the
//! browser settings exported for the test processes.

use clap::Parser;
use tracing::{error, info};

use playbill_cli::launcher::{self, Launch, Suite};
use playbill_common::BrowserKind;

/// Playbill - Screenplay browser test launcher
#[derive(Parser)]
#[command(name = "playbill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Type of tests to run
    #[arg(long = "type", value_enum, default_value_t = Suite::All)]
    suite: Suite,

    /// Browser to use for tests (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: BrowserKind,

    /// Run tests in headed mode
    #[arg(long)]
    headed: bool,

    /// Number of parallel test threads
    #[arg(long, default_value_t = 1)]
    parallel: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug || cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let launch = Launch {
        suite: cli.suite,
        browser: cli.browser,
        headed: cli.headed,
        parallel: cli.parallel,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    launcher::prepare_dirs(&std::env::current_dir()?)?;
    let status = launcher::run(&launch).await?;

    if status.success() {
        info!("✅ {} tests completed successfully", launch.suite);
        Ok(())
    } else {
        let code = status.code().unwrap_or(1);
        error!("❌ Command failed with exit code {}", code);
        std::process::exit(code);
    }
}

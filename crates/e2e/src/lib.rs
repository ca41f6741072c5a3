//! Playbill Screenplay Framework
//!
//! Browser tests written as actors performing tasks:
//! - Actors hold abilities, such as browsing the web through a [`Page`]
//! - Tasks compose interactions; questions read state back
//! - Flaky steps and scenarios are rerun through the shared retry executor
//! - Playwright is driven by generated node scripts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Stage (runner)                         │
//! │    ├── filter by tag / skip in CI                           │
//! │    ├── rerun via RetryPolicy::decorate                      │
//! │    ├── failure screenshot -> ScreenshotManager              │
//! │    └── write_results -> reports/test-results.json           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Actor                                                      │
//! │    ├── who_can(BrowseTheWeb { page: Arc<dyn Page> })        │
//! │    ├── attempts_to([Login, Navigate, Click, Type, ...])     │
//! │    └── asks(Text, CurrentUrl, Visibility, ...)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page                                                       │
//! │    ├── PlaywrightPage (node + playwright)                   │
//! │    └── FakePage (in-memory, for tests)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod data;
pub mod error;
pub mod fake;
pub mod logging;
pub mod page;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod screenplay;
pub mod screenshot;

pub use error::{E2eError, E2eResult};
pub use fake::FakePage;
pub use page::{Page, WaitState};
pub use playwright::{PlaywrightConfig, PlaywrightPage};
pub use runner::{scenario, Scenario, Stage, SuiteResult};
pub use screenplay::{Ability, Actor, BrowseTheWeb, Performable, Question};
pub use screenshot::ScreenshotManager;

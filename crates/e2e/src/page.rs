//! Browser page driver seam
//!
//! Screenplay interactions talk to a [`Page`]; [`crate::playwright::PlaywrightPage`]
//! drives a real browser, [`crate::fake::FakePage`] keeps everything in memory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::E2eResult;

/// Element state to wait for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One open browser page
#[async_trait]
pub trait Page: Send + Sync {
    /// Load `url` and wait for the network to go idle
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn wait_for_selector(&self, selector: &str, state: WaitState) -> E2eResult<()>;

    async fn click(&self, selector: &str) -> E2eResult<()>;

    /// Replace the value of an input
    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()>;

    /// Type `text` key by key, appending to the current value
    async fn type_text(&self, selector: &str, text: &str) -> E2eResult<()>;

    /// `None` when the element has no text node
    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>>;

    async fn is_visible(&self, selector: &str) -> E2eResult<bool>;

    async fn query_selector_exists(&self, selector: &str) -> E2eResult<bool>;

    async fn url(&self) -> E2eResult<String>;

    async fn title(&self) -> E2eResult<String>;

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()>;
}

//! Questions about page state

use async_trait::async_trait;
use std::fmt;

use super::abilities::BrowseTheWeb;
use super::{Actor, Question};
use crate::error::E2eResult;
use crate::page::WaitState;

/// Text content of an element, waiting for it to become visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    selector: String,
}

impl Text {
    pub fn of(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }
}

#[async_trait]
impl Question for Text {
    type Answer = String;

    async fn answered_by(&self, actor: &Actor) -> E2eResult<String> {
        let page = BrowseTheWeb::as_actor(actor)?;
        page.wait_for_selector(&self.selector, WaitState::Visible).await?;
        Ok(page.text_content(&self.selector).await?.unwrap_or_default())
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text of '{}'", self.selector)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentUrl;

#[async_trait]
impl Question for CurrentUrl {
    type Answer = String;

    async fn answered_by(&self, actor: &Actor) -> E2eResult<String> {
        BrowseTheWeb::as_actor(actor)?.url().await
    }
}

impl fmt::Display for CurrentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Current URL")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTitle;

#[async_trait]
impl Question for PageTitle {
    type Answer = String;

    async fn answered_by(&self, actor: &Actor) -> E2eResult<String> {
        BrowseTheWeb::as_actor(actor)?.title().await
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Page title")
    }
}

/// Whether an element is displayed. Driver errors read as `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visibility {
    selector: String,
}

impl Visibility {
    pub fn of(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }
}

#[async_trait]
impl Question for Visibility {
    type Answer = bool;

    async fn answered_by(&self, actor: &Actor) -> E2eResult<bool> {
        let page = BrowseTheWeb::as_actor(actor)?;
        Ok(page.is_visible(&self.selector).await.unwrap_or(false))
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Visibility of '{}'", self.selector)
    }
}

/// Whether an element is in the DOM at all. Driver errors read as `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    selector: String,
}

impl Presence {
    pub fn of(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }
}

#[async_trait]
impl Question for Presence {
    type Answer = bool;

    async fn answered_by(&self, actor: &Actor) -> E2eResult<bool> {
        let page = BrowseTheWeb::as_actor(actor)?;
        Ok(page.query_selector_exists(&self.selector).await.unwrap_or(false))
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Presence of '{}'", self.selector)
    }
}

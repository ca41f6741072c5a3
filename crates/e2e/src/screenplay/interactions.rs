//! Low-level page interactions

use async_trait::async_trait;
use std::fmt;

use playbill_common::retry::{AttemptRecorder, RetryHooks, RetryPolicy, Sleeper};

use super::abilities::BrowseTheWeb;
use super::{Actor, Performable};
use crate::error::{E2eError, E2eResult};
use crate::logging;
use crate::page::WaitState;

/// Open a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigate {
    url: String,
}

impl Navigate {
    pub fn to(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl Performable for Navigate {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let page = BrowseTheWeb::as_actor(actor)?;
        logging::action("Navigate", &self.url, "");
        page.goto(&self.url).await
    }
}

impl fmt::Display for Navigate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Navigate to '{}'", self.url)
    }
}

/// Click an element once it is visible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Click {
    selector: String,
}

impl Click {
    pub fn on(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }
}

#[async_trait]
impl Performable for Click {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let page = BrowseTheWeb::as_actor(actor)?;
        logging::action("Click", &self.selector, "");
        page.wait_for_selector(&self.selector, WaitState::Visible).await?;
        page.click(&self.selector).await
    }
}

impl fmt::Display for Click {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Click on '{}'", self.selector)
    }
}

/// Type text into an element once it is visible, clearing it first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    text: String,
    selector: String,
    clear: bool,
}

/// First half of `Type::the_text(..).into(..)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeText {
    text: String,
}

impl Type {
    pub fn the_text(text: impl Into<String>) -> TypeText {
        TypeText { text: text.into() }
    }

    /// Append to whatever the element already holds
    pub fn without_clearing(mut self) -> Self {
        self.clear = false;
        self
    }
}

impl TypeText {
    #[allow(clippy::should_implement_trait)]
    pub fn into(self, selector: impl Into<String>) -> Type {
        Type { text: self.text, selector: selector.into(), clear: true }
    }
}

#[async_trait]
impl Performable for Type {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let page = BrowseTheWeb::as_actor(actor)?;
        logging::action("Type", &self.selector, "");
        page.wait_for_selector(&self.selector, WaitState::Visible).await?;
        if self.clear {
            page.fill(&self.selector, "").await?;
        }
        page.type_text(&self.selector, &self.text).await
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type '{}' into '{}'", self.text, self.selector)
    }
}

/// Any performable, re-run under a retry policy when it fails with a
/// retryable kind
pub struct Retried<P> {
    inner: P,
    policy: RetryPolicy,
    hooks: RetryHooks<E2eError>,
}

impl<P: Performable> Retried<P> {
    pub fn interaction(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy, hooks: RetryHooks::default() }
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.hooks = self.hooks.with_sleeper(sleeper);
        self
    }

    pub fn with_recorder(mut self, recorder: impl AttemptRecorder + 'static) -> Self {
        self.hooks = self.hooks.with_recorder(recorder);
        self
    }
}

#[async_trait]
impl<P: Performable> Performable for Retried<P> {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        self.policy
            .decorate(|()| self.inner.perform_as(actor))
            .named(self.inner.to_string())
            .with_hooks(self.hooks.clone())
            .call(())
            .await?;
        Ok(())
    }
}

impl<P: Performable> fmt::Display for Retried<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (up to {} attempts)", self.inner, self.policy.max_attempts())
    }
}

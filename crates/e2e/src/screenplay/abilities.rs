//! Abilities actors can be granted

use std::fmt;
use std::sync::Arc;

use super::{Ability, Actor};
use crate::error::E2eResult;
use crate::page::Page;

/// Ability to drive a browser page
#[derive(Clone)]
pub struct BrowseTheWeb {
    page: Arc<dyn Page>,
}

impl BrowseTheWeb {
    /// Browse using an already shared page
    pub fn using(page: Arc<dyn Page>) -> Self {
        Self { page }
    }

    pub fn with_page(page: impl Page + 'static) -> Self {
        Self::using(Arc::new(page))
    }

    pub fn page(&self) -> &dyn Page {
        self.page.as_ref()
    }

    /// The page handle, for code that outlives the actor
    pub fn shared_page(&self) -> Arc<dyn Page> {
        Arc::clone(&self.page)
    }

    /// Shortcut for the page of an actor that can browse
    pub fn as_actor(actor: &Actor) -> E2eResult<&dyn Page> {
        Ok(actor.ability_to::<BrowseTheWeb>()?.page())
    }
}

impl Ability for BrowseTheWeb {
    const NAME: &'static str = "BrowseTheWeb";
}

impl fmt::Debug for BrowseTheWeb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BrowseTheWeb")
    }
}

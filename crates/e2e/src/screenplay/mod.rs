//! Screenplay vocabulary
//!
//! An [`Actor`] holds abilities, performs tasks and interactions
//! ([`Performable`]) and asks [`Question`]s about what it sees.
//!
//! ```text
//! Actor::new("Alice").who_can(BrowseTheWeb::using(page))
//!     .attempts_to(&[&Login::with_valid_credentials(&settings)])   // Task
//!         → Navigate / Type / Click                                  // Interactions
//!             → BrowseTheWeb → Page
//!     .asks(&CurrentUrl)                                             // Question
//! ```

pub mod abilities;
pub mod interactions;
pub mod questions;
pub mod tasks;

use async_trait::async_trait;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{E2eError, E2eResult};

pub use abilities::BrowseTheWeb;
pub use interactions::{Click, Navigate, Retried, Type};
pub use questions::{CurrentUrl, PageTitle, Presence, Text, Visibility};
pub use tasks::{EnterCredentials, Login, NavigateToLoginPage, SubmitLoginForm};

/// Something an actor can do: a business-level task or a single interaction
#[async_trait]
pub trait Performable: fmt::Display + Send + Sync {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()>;
}

/// Something an actor can find out about the system
#[async_trait]
pub trait Question: fmt::Display + Send + Sync {
    type Answer: Send;

    async fn answered_by(&self, actor: &Actor) -> E2eResult<Self::Answer>;
}

/// A capability an actor holds, looked up by type
pub trait Ability: Send + Sync + 'static {
    const NAME: &'static str;
}

/// A user of the system under test
#[derive(Clone)]
pub struct Actor {
    name: String,
    abilities: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), abilities: HashMap::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grant an ability, replacing any held ability of the same type
    pub fn who_can<A: Ability>(mut self, ability: A) -> Self {
        debug!("{} can {}", self.name, A::NAME);
        self.abilities.insert(TypeId::of::<A>(), Arc::new(ability));
        self
    }

    pub fn has_ability_to<A: Ability>(&self) -> bool {
        self.abilities.contains_key(&TypeId::of::<A>())
    }

    pub fn ability_to<A: Ability>(&self) -> E2eResult<&A> {
        self.abilities
            .get(&TypeId::of::<A>())
            .and_then(|ability| ability.downcast_ref::<A>())
            .ok_or_else(|| E2eError::MissingAbility {
                actor: self.name.clone(),
                ability: A::NAME,
            })
    }

    /// Perform each item in order, stopping at the first failure
    pub async fn attempts_to(&self, performables: &[&dyn Performable]) -> E2eResult<()> {
        for performable in performables {
            debug!("{} attempts to {}", self.name, performable);
            performable.perform_as(self).await?;
        }
        Ok(())
    }

    pub async fn asks<Q: Question>(&self, question: &Q) -> E2eResult<Q::Answer> {
        debug!("{} asks for {}", self.name, question);
        question.answered_by(self).await
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({})", self.name)
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("name", &self.name)
            .field("abilities", &self.abilities.len())
            .finish()
    }
}

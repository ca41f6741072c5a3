//! Business-level tasks for the practice login flow

use async_trait::async_trait;
use std::fmt;

use playbill_common::Settings;

use super::interactions::{Click, Navigate, Type};
use super::{Actor, Performable};
use crate::error::E2eResult;
use crate::pages::login_page;

/// Login page of the built-in practice site. `BASE_URL` is not consulted;
/// callers targeting another deployment go through `.at(..)` or the
/// `&Settings` constructors.
fn default_login_url() -> String {
    Settings::default().test_urls().login
}

/// Open the login form, fill both fields and submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    username: String,
    password: String,
    login_url: String,
}

impl Login {
    /// Log in on the built-in practice site; chain `.at(..)` for any other
    pub fn with_credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            login_url: default_login_url(),
        }
    }

    pub fn with_valid_credentials(settings: &Settings) -> Self {
        let valid = settings.credentials().valid;
        Self::with_credentials(valid.username, valid.password).at(settings.test_urls().login)
    }

    pub fn with_invalid_credentials(settings: &Settings) -> Self {
        let invalid = settings.credentials().invalid;
        Self::with_credentials(invalid.username, invalid.password).at(settings.test_urls().login)
    }

    /// Use a different login page
    pub fn at(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = login_url.into();
        self
    }
}

#[async_trait]
impl Performable for Login {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let navigate = Navigate::to(&self.login_url);
        let username = Type::the_text(&self.username).into(login_page::USERNAME_FIELD);
        let password = Type::the_text(&self.password).into(login_page::PASSWORD_FIELD);
        let submit = Click::on(login_page::SUBMIT_BUTTON);

        let steps: [&dyn Performable; 4] = [&navigate, &username, &password, &submit];
        actor.attempts_to(&steps).await
    }
}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Login with username '{}'", self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigateToLoginPage {
    login_url: String,
}

impl NavigateToLoginPage {
    pub fn at(login_url: impl Into<String>) -> Self {
        Self { login_url: login_url.into() }
    }

    pub fn using(settings: &Settings) -> Self {
        Self::at(settings.test_urls().login)
    }
}

/// The built-in practice site; use [`NavigateToLoginPage::using`] to honour `BASE_URL`
impl Default for NavigateToLoginPage {
    fn default() -> Self {
        Self::at(default_login_url())
    }
}

#[async_trait]
impl Performable for NavigateToLoginPage {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        actor.attempts_to(&[&Navigate::to(&self.login_url)]).await
    }
}

impl fmt::Display for NavigateToLoginPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Navigate to login page")
    }
}

/// Fill both login fields without submitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterCredentials {
    username: String,
    password: String,
}

impl EnterCredentials {
    pub fn with_values(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

#[async_trait]
impl Performable for EnterCredentials {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        let username = Type::the_text(&self.username).into(login_page::USERNAME_FIELD);
        let password = Type::the_text(&self.password).into(login_page::PASSWORD_FIELD);
        actor.attempts_to(&[&username, &password]).await
    }
}

impl fmt::Display for EnterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Enter credentials (username: '{}')", self.username)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmitLoginForm;

#[async_trait]
impl Performable for SubmitLoginForm {
    async fn perform_as(&self, actor: &Actor) -> E2eResult<()> {
        actor.attempts_to(&[&Click::on(login_page::SUBMIT_BUTTON)]).await
    }
}

impl fmt::Display for SubmitLoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Submit login form")
    }
}

//! In-memory page for exercising screenplay code without a browser

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::{E2eError, E2eResult};
use crate::page::{Page, WaitState};
use crate::pages::{logged_in_page, login_page};

/// A call the page received, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCall {
    Goto(String),
    WaitFor(String, WaitState),
    Click(String),
    Fill(String, String),
    Type(String, String),
    Screenshot(PathBuf),
}

#[derive(Debug, Clone, Default)]
struct Element {
    text: Option<String>,
    value: String,
    visible: bool,
}

/// Credentials the fake login form accepts
#[derive(Debug, Clone)]
struct LoginForm {
    username: String,
    password: String,
    success_url: String,
}

#[derive(Debug, Default)]
struct State {
    url: String,
    title: String,
    elements: HashMap<String, Element>,
    calls: Vec<PageCall>,
    /// Errors handed out, one per touch, before a selector behaves
    failures: HashMap<String, VecDeque<E2eError>>,
    login: Option<LoginForm>,
    screenshots_fail: bool,
}

/// Scriptable [`Page`] double.
///
/// Unknown selectors time out on `wait_for_selector` and are not found on
/// `click`, `fill` and `type_text`, mirroring the way a real browser
/// reports them.
#[derive(Debug, Default)]
pub struct FakePage {
    state: Mutex<State>,
}

impl FakePage {
    pub fn new() -> Self {
        let page = Self::default();
        page.state.lock().url = "about:blank".to_string();
        page
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        self.state.lock().title = title.into();
        self
    }

    /// Add a visible element with the given text
    pub fn with_element(self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        self.state.lock().elements.insert(
            selector.into(),
            Element { text: Some(text).filter(|t| !t.is_empty()), visible: true, ..Default::default() },
        );
        self
    }

    /// Add an element that is attached but not displayed
    pub fn with_hidden_element(self, selector: impl Into<String>) -> Self {
        self.state.lock().elements.insert(selector.into(), Element::default());
        self
    }

    /// The next `errors.len()` touches of `selector` fail with these errors
    pub fn failing_with(self, selector: impl Into<String>, errors: Vec<E2eError>) -> Self {
        self.state.lock().failures.insert(selector.into(), errors.into());
        self
    }

    pub fn with_failing_screenshots(self) -> Self {
        self.state.lock().screenshots_fail = true;
        self
    }

    /// Serve the practice login form: visiting any URL under the login path
    /// shows the form, submitting the right credentials moves to `success_url`.
    pub fn with_login_form(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
        success_url: impl Into<String>,
    ) -> Self {
        self.state.lock().login = Some(LoginForm {
            username: username.into(),
            password: password.into(),
            success_url: success_url.into(),
        });
        self
    }

    pub fn calls(&self) -> Vec<PageCall> {
        self.state.lock().calls.clone()
    }

    /// Current value of an input
    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.state.lock().elements.get(selector).map(|e| e.value.clone())
    }

    fn touch(state: &mut State, selector: &str) -> E2eResult<()> {
        match state.failures.get_mut(selector).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn element<'a>(state: &'a mut State, selector: &str) -> E2eResult<&'a mut Element> {
        state
            .elements
            .get_mut(selector)
            .ok_or_else(|| E2eError::ElementNotFound(selector.to_string()))
    }

    fn show_login_form(state: &mut State) {
        for selector in [login_page::USERNAME_FIELD, login_page::PASSWORD_FIELD] {
            state.elements.insert(selector.to_string(), Element { visible: true, ..Default::default() });
        }
        state.elements.insert(
            login_page::SUBMIT_BUTTON.to_string(),
            Element { text: Some("Submit".to_string()), visible: true, ..Default::default() },
        );
        state.elements.insert(login_page::ERROR_MESSAGE.to_string(), Element::default());
    }

    fn submit_login(state: &mut State) {
        let Some(form) = state.login.clone() else { return };
        let value_of = |selector: &str| {
            state.elements.get(selector).map(|e| e.value.clone()).unwrap_or_default()
        };
        let username = value_of(login_page::USERNAME_FIELD);
        let password = value_of(login_page::PASSWORD_FIELD);

        let error = if username != form.username {
            Some("Your username is invalid!")
        } else if password != form.password {
            Some("Your password is invalid!")
        } else {
            None
        };

        match error {
            Some(message) => {
                state.elements.insert(
                    login_page::ERROR_MESSAGE.to_string(),
                    Element { text: Some(message.to_string()), visible: true, ..Default::default() },
                );
            }
            None => {
                state.url = form.success_url;
                state.title = "Logged In Successfully | Practice Test Automation".to_string();
                state.elements.clear();
                state.elements.insert(
                    logged_in_page::SUCCESS_MESSAGE.to_string(),
                    Element {
                        text: Some("Logged In Successfully".to_string()),
                        visible: true,
                        ..Default::default()
                    },
                );
                state.elements.insert(
                    logged_in_page::LOGOUT_LINK.to_string(),
                    Element { text: Some("Log out".to_string()), visible: true, ..Default::default() },
                );
            }
        }
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::Goto(url.to_string()));
        Self::touch(&mut state, url)?;
        state.url = url.to_string();
        if state.login.is_some() && url.contains(login_page::URL_PATH) {
            state.title = "Test Login | Practice Test Automation".to_string();
            Self::show_login_form(&mut state);
        }
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, wait: WaitState) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::WaitFor(selector.to_string(), wait));
        Self::touch(&mut state, selector)?;
        let element = state.elements.get(selector);
        let satisfied = match wait {
            WaitState::Visible => element.is_some_and(|e| e.visible),
            WaitState::Hidden => element.map_or(true, |e| !e.visible),
            WaitState::Attached => element.is_some(),
            WaitState::Detached => element.is_none(),
        };
        if satisfied {
            Ok(())
        } else {
            Err(E2eError::Timeout(format!("{} to be {}", selector, wait)))
        }
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::Click(selector.to_string()));
        Self::touch(&mut state, selector)?;
        if !Self::element(&mut state, selector)?.visible {
            return Err(E2eError::NotInteractable(selector.to_string()));
        }
        if selector == login_page::SUBMIT_BUTTON {
            Self::submit_login(&mut state);
        }
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::Fill(selector.to_string(), value.to_string()));
        Self::touch(&mut state, selector)?;
        Self::element(&mut state, selector)?.value = value.to_string();
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> E2eResult<()> {
        let mut state = self.state.lock();
        state.calls.push(PageCall::Type(selector.to_string(), text.to_string()));
        Self::touch(&mut state, selector)?;
        Self::element(&mut state, selector)?.value.push_str(text);
        Ok(())
    }

    async fn text_content(&self, selector: &str) -> E2eResult<Option<String>> {
        let mut state = self.state.lock();
        Self::touch(&mut state, selector)?;
        Ok(Self::element(&mut state, selector)?.text.clone())
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        let mut state = self.state.lock();
        Self::touch(&mut state, selector)?;
        Ok(state.elements.get(selector).is_some_and(|e| e.visible))
    }

    async fn query_selector_exists(&self, selector: &str) -> E2eResult<bool> {
        let mut state = self.state.lock();
        Self::touch(&mut state, selector)?;
        Ok(state.elements.contains_key(selector))
    }

    async fn url(&self) -> E2eResult<String> {
        Ok(self.state.lock().url.clone())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.state.lock().title.clone())
    }

    async fn screenshot(&self, path: &Path, _full_page: bool) -> E2eResult<()> {
        {
            let mut state = self.state.lock();
            state.calls.push(PageCall::Screenshot(path.to_path_buf()));
            if state.screenshots_fail {
                return Err(E2eError::Playwright("Target page has been closed".to_string()));
            }
        }
        std::fs::write(path, b"\x89PNG\r\n\x1a\n")?;
        Ok(())
    }
}

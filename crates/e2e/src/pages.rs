//! Locators for the practice site

/// The practice login form
pub mod login_page {
    pub const URL_PATH: &str = "/practice-test-login/";

    pub const USERNAME_FIELD: &str = "#username";
    pub const PASSWORD_FIELD: &str = "#password";
    pub const SUBMIT_BUTTON: &str = "#submit";

    pub const ERROR_MESSAGE: &str = "#error";
    pub const PAGE_TITLE: &str = "h2";
    pub const LOGIN_FORM: &str = "#login";
}

/// The page shown after a successful login
pub mod logged_in_page {
    pub const URL_PATH: &str = "/logged-in-successfully/";

    pub const SUCCESS_MESSAGE: &str = ".post-title";
    pub const CONTENT_AREA: &str = ".post-content";
    pub const LOGOUT_LINK: &str = "a[href*='logout']";
}

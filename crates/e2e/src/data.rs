//! Login scenarios for the practice site

use serde::{Deserialize, Serialize};

/// What a login attempt should lead to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expected {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCase {
    pub username: String,
    pub password: String,
    pub description: String,
    pub expected: Expected,
}

impl LoginCase {
    fn new(username: impl Into<String>, password: impl Into<String>, description: &str, expected: Expected) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            description: description.to_string(),
            expected,
        }
    }

    pub fn valid_user() -> Self {
        Self::new("student", "Password123", "Valid user credentials", Expected::Success)
    }

    pub fn invalid_username() -> Self {
        Self::new("incorrectUser", "Password123", "Invalid username with valid password", Expected::Failure)
    }

    pub fn invalid_password() -> Self {
        Self::new("student", "incorrectPassword", "Valid username with invalid password", Expected::Failure)
    }

    pub fn both_invalid() -> Self {
        Self::new("incorrectUser", "incorrectPassword", "Both username and password invalid", Expected::Failure)
    }

    pub fn empty_username() -> Self {
        Self::new("", "Password123", "Empty username with valid password", Expected::Failure)
    }

    pub fn empty_password() -> Self {
        Self::new("student", "", "Valid username with empty password", Expected::Failure)
    }

    pub fn both_empty() -> Self {
        Self::new("", "", "Both username and password empty", Expected::Failure)
    }

    pub fn special_chars_username() -> Self {
        Self::new("user@#$%", "Password123", "Username with special characters", Expected::Failure)
    }

    pub fn long_username() -> Self {
        Self::new("a".repeat(100), "Password123", "Very long username", Expected::Failure)
    }

    pub fn long_password() -> Self {
        Self::new("student", "a".repeat(100), "Very long password", Expected::Failure)
    }

    pub fn should_succeed(&self) -> bool {
        self.expected == Expected::Success
    }
}

pub fn all_cases() -> Vec<LoginCase> {
    vec![
        LoginCase::valid_user(),
        LoginCase::invalid_username(),
        LoginCase::invalid_password(),
        LoginCase::both_invalid(),
        LoginCase::empty_username(),
        LoginCase::empty_password(),
        LoginCase::both_empty(),
        LoginCase::special_chars_username(),
        LoginCase::long_username(),
        LoginCase::long_password(),
    ]
}

pub fn valid_cases() -> Vec<LoginCase> {
    all_cases().into_iter().filter(LoginCase::should_succeed).collect()
}

pub fn invalid_cases() -> Vec<LoginCase> {
    all_cases().into_iter().filter(|case| !case.should_succeed()).collect()
}

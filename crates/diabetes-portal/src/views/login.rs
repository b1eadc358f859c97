use minijinja::context;
use serde::Deserialize;

use super::{frame, render};
use crate::controller::{GuestPage, Notice};

pub const MISSING_CREDENTIALS: &str = "Please enter both username and password.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";
pub const LOGIN_SUCCESS: &str = "Login successful! Redirecting to prediction page...";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// Both fields must be present before the credential check runs.
    pub fn review(&self) -> Result<(&str, &str), &'static str> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(MISSING_CREDENTIALS);
        }
        Ok((&self.username, &self.password))
    }
}

/// Login form. Only the username is echoed back on a re-render.
pub fn page(notices: &[Notice], username: &str) -> Result<String, minijinja::Error> {
    let base = frame("Login Page", Some(GuestPage::Login), notices);
    render("login.html", context! { username => username, ..base })
}

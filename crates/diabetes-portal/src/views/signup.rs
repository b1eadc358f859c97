use minijinja::context;
use serde::{Deserialize, Serialize};

use super::{frame, render};
use crate::auth::{NewUser, ValidationError};
use crate::controller::{GuestPage, Notice};

pub const SIGNUP_SUCCESS: &str = "Signup successful! You can now log in.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub mobile_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl SignupForm {
    /// Form-level checks: every field present, then matching passwords.
    /// Email and mobile-number checks belong to the auth service.
    pub fn review(&self) -> Result<NewUser, ValidationError> {
        let fields = [
            &self.username,
            &self.full_name,
            &self.place,
            &self.mobile_number,
            &self.email,
            &self.password,
            &self.confirm_password,
        ];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(NewUser {
            username: self.username.clone(),
            password: self.password.clone(),
            full_name: self.full_name.clone(),
            place: self.place.clone(),
            mobile_number: self.mobile_number.clone(),
            email: self.email.clone(),
        })
    }
}

#[derive(Serialize)]
struct TextField<'a> {
    label: &'static str,
    name: &'static str,
    value: &'a str,
}

/// Signup form; a rejected submission is echoed back without its passwords.
pub fn page(notices: &[Notice], previous: Option<&SignupForm>) -> Result<String, minijinja::Error> {
    let empty = SignupForm::default();
    let form = previous.unwrap_or(&empty);

    let fields = [
        TextField { label: "Username", name: "username", value: &form.username },
        TextField { label: "Full Name", name: "full_name", value: &form.full_name },
        TextField { label: "Place/City", name: "place", value: &form.place },
        TextField { label: "Mobile Number", name: "mobile_number", value: &form.mobile_number },
        TextField { label: "Email", name: "email", value: &form.email },
    ];
    let base = frame("Signup Page", Some(GuestPage::Signup), notices);
    render("signup.html", context! { fields => fields, ..base })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SignupForm {
        SignupForm {
            username: "alice".into(),
            full_name: "Alice A".into(),
            place: "Springfield".into(),
            mobile_number: "5551234567".into(),
            email: "alice@example.com".into(),
            password: "Secret1!".into(),
            confirm_password: "Secret1!".into(),
        }
    }

    #[test]
    fn test_review_builds_new_user() {
        let user = filled().review().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, "Secret1!");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn test_missing_confirmation_is_a_missing_field() {
        let mut form = filled();
        form.confirm_password.clear();
        assert_eq!(form.review().unwrap_err(), ValidationError::MissingFields);
    }

    #[test]
    fn test_missing_fields_reported_before_mismatch() {
        let mut form = filled();
        form.place.clear();
        form.confirm_password = "other".into();
        assert_eq!(form.review().unwrap_err(), ValidationError::MissingFields);
    }

    #[test]
    fn test_password_mismatch() {
        let mut form = filled();
        form.confirm_password = "Secret2!".into();
        assert_eq!(form.review().unwrap_err(), ValidationError::PasswordMismatch);
    }

    #[test]
    fn test_rerender_keeps_fields_but_not_passwords() {
        let html = page(&[], Some(&filled())).unwrap();
        assert!(html.contains("value=\"alice@example.com\""));
        assert!(html.contains("value=\"Springfield\""));
        assert!(!html.contains("Secret1!"));
        assert!(html.contains("<title>Signup Page</title>"));
    }
}

//! Signup field checks, applied before anything reaches the credential store.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Anchored at the start only: trailing text after the TLD is accepted.
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@]+@[^@]+\.[^@]+").unwrap();
}

pub const MOBILE_MIN_DIGITS: usize = 7;
pub const MOBILE_MAX_DIGITS: usize = 15;

/// Why a signup was refused before touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill out all required fields.")]
    MissingFields,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Invalid email address.")]
    InvalidEmail,

    #[error("Invalid mobile number.")]
    InvalidMobileNumber,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_mobile_number(mobile_number: &str) -> bool {
    (MOBILE_MIN_DIGITS..=MOBILE_MAX_DIGITS).contains(&mobile_number.len())
        && mobile_number.bytes().all(|b| b.is_ascii_digit())
}

//! Password hashing schemes.

use std::fmt;
use std::str::FromStr;

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use lazy_static::lazy_static;
use sha2::{Digest, Sha256};

lazy_static! {
    /// Stand-in hashes verified for unknown usernames so a miss costs as
    /// much as a wrong password.
    static ref DUMMY_ARGON2: String = SaltString::encode_b64(b"no-such-user-salt")
        .ok()
        .and_then(|salt| {
            Argon2::default()
                .hash_password(b"no-such-user", &salt)
                .ok()
                .map(|hash| hash.to_string())
        })
        .unwrap_or_default();
    static ref DUMMY_SHA256: String = sha256_hex("no-such-user");
}

#[cfg(test)]
thread_local! {
    pub(crate) static VERIFY_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// How new passwords are hashed. Verification accepts either format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordScheme {
    /// Salted Argon2id, stored as a PHC string.
    #[default]
    Argon2,
    /// Unsalted SHA-256 hex digest. Deterministic; compatible with legacy tables.
    Sha256,
}

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

impl PasswordScheme {
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        match self {
            Self::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|hash| hash.to_string())
                    .map_err(|e| HashError(e.to_string()))
            }
            Self::Sha256 => Ok(sha256_hex(password)),
        }
    }

    /// A hash in this scheme that no real password is expected to match.
    pub fn dummy_hash(&self) -> &'static str {
        match self {
            Self::Argon2 => DUMMY_ARGON2.as_str(),
            Self::Sha256 => DUMMY_SHA256.as_str(),
        }
    }

    /// Check `password` against a stored hash of either scheme.
    pub fn verify(password: &str, stored: &str) -> bool {
        #[cfg(test)]
        VERIFY_CALLS.with(|calls| calls.set(calls.get() + 1));

        if stored.starts_with("$argon2") {
            match PasswordHash::new(stored) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            }
        } else {
            constant_time_eq(sha256_hex(password).as_bytes(), stored.as_bytes())
        }
    }
}

impl fmt::Display for PasswordScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argon2 => f.write_str("argon2"),
            Self::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for PasswordScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(Self::Argon2),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            other => Err(format!("unknown password scheme '{}' (expected argon2 or sha256)", other)),
        }
    }
}

/// Lowercase hex SHA-256 of the UTF-8 password.
pub fn sha256_hex(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

//! Signup and login against the credential store.
pub mod password;
pub mod validation;
pub use password::{sha256_hex, HashError, PasswordScheme};
pub use validation::ValidationError;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::credential_db::{CredentialDatabase, NewUserRow, StoreError};
use crate::metrics;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Username already exists. Please choose a different one.")]
    DuplicateUsername,

    #[error("Email already registered. Please use a different email.")]
    DuplicateEmail,

    #[error("credential store unavailable: {0}")]
    Storage(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUsername => Self::DuplicateUsername,
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(e: HashError) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Signup request with a plaintext password. The confirmation field is
/// checked by the signup view, not here.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub place: String,
    pub mobile_number: String,
    pub email: String,
}

impl NewUser {
    /// Field checks in reporting order: emptiness, email shape, mobile number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            &self.username,
            &self.password,
            &self.full_name,
            &self.place,
            &self.mobile_number,
            &self.email,
        ];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if !validation::is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        if !validation::is_valid_mobile_number(&self.mobile_number) {
            return Err(ValidationError::InvalidMobileNumber);
        }
        Ok(())
    }
}

pub struct AuthService {
    database: Arc<CredentialDatabase>,
    scheme: PasswordScheme,
}

impl AuthService {
    pub fn new(database: Arc<CredentialDatabase>, scheme: PasswordScheme) -> Self {
        Self { database, scheme }
    }

    pub fn database(&self) -> &CredentialDatabase {
        &self.database
    }

    pub fn signup(&self, user: &NewUser) -> Result<(), AuthError> {
        if let Err(e) = user.validate() {
            debug!("Signup for '{}' rejected: {}", user.username, e);
            metrics::inc_auth_event("signup", "invalid");
            return Err(e.into());
        }

        let password_hash = self.scheme.hash(&user.password)?;
        let row = NewUserRow {
            username: &user.username,
            password_hash: &password_hash,
            full_name: &user.full_name,
            place: &user.place,
            mobile_number: &user.mobile_number,
            email: &user.email,
        };

        match self.database.users.insert_user(&row) {
            Ok(()) => {
                info!("New user signed up: {}", user.username);
                metrics::inc_auth_event("signup", "ok");
                Ok(())
            }
            Err(e) => {
                let err = AuthError::from(e);
                match &err {
                    AuthError::Storage(detail) => {
                        warn!("Signup for '{}' failed: {}", user.username, detail);
                        metrics::inc_auth_event("signup", "storage_error");
                    }
                    _ => {
                        info!("Signup for '{}' rejected: {}", user.username, err);
                        metrics::inc_auth_event("signup", "duplicate");
                    }
                }
                Err(err)
            }
        }
    }

    /// `Ok(false)` for an unknown username and for a wrong password alike.
    pub fn login(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let stored = match self.database.users.find_password_hash(username) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Login lookup failed: {}", e);
                metrics::inc_auth_event("login", "storage_error");
                return Err(e.into());
            }
        };

        // Unknown users still pay for one verification.
        let accepted = match stored {
            Some(hash) => PasswordScheme::verify(password, &hash),
            None => {
                PasswordScheme::verify(password, self.scheme.dummy_hash());
                false
            }
        };

        if accepted {
            info!("User logged in: {}", username);
            metrics::inc_auth_event("login", "ok");
        } else {
            info!("Login refused for '{}'", username);
            metrics::inc_auth_event("login", "refused");
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let db = Arc::new(CredentialDatabase::new_in_memory().unwrap());
        AuthService::new(db, PasswordScheme::Sha256)
    }

    fn alice() -> NewUser {
        NewUser {
            username: "alice".into(),
            password: "Secret1!".into(),
            full_name: "Alice A".into(),
            place: "Springfield".into(),
            mobile_number: "5551234567".into(),
            email: "alice@example.com".into(),
        }
    }

    #[test]
    fn test_signup_then_login() {
        let auth = service();
        auth.signup(&alice()).unwrap();

        assert!(auth.login("alice", "Secret1!").unwrap());
    }

    #[test]
    fn test_signup_with_argon2_then_login() {
        let db = Arc::new(CredentialDatabase::new_in_memory().unwrap());
        let auth = AuthService::new(db, PasswordScheme::Argon2);
        auth.signup(&alice()).unwrap();

        assert!(auth.login("alice", "Secret1!").unwrap());
        assert!(!auth.login("alice", "Secret2!").unwrap());
    }

    #[test]
    fn test_stored_password_is_the_digest() {
        let auth = service();
        auth.signup(&alice()).unwrap();

        let stored = auth.database().users.find_password_hash("alice").unwrap().unwrap();
        assert_eq!(stored, sha256_hex("Secret1!"));
        assert_ne!(stored, "Secret1!");
    }

    #[test]
    fn test_wrong_password_and_unknown_user_look_the_same() {
        let auth = service();
        auth.signup(&alice()).unwrap();

        let wrong_password = auth.login("alice", "nope").unwrap();
        let unknown_user = auth.login("mallory", "Secret1!").unwrap();
        assert!(!wrong_password);
        assert_eq!(wrong_password, unknown_user);
    }

    #[test]
    fn test_unknown_user_still_verifies_once() {
        for scheme in [PasswordScheme::Sha256, PasswordScheme::Argon2] {
            let db = Arc::new(CredentialDatabase::new_in_memory().unwrap());
            let auth = AuthService::new(db, scheme);
            auth.signup(&alice()).unwrap();

            password::VERIFY_CALLS.with(|calls| calls.set(0));
            assert!(!auth.login("alice", "nope").unwrap());
            let known = password::VERIFY_CALLS.with(|calls| calls.get());

            password::VERIFY_CALLS.with(|calls| calls.set(0));
            assert!(!auth.login("mallory", "nope").unwrap());
            let unknown = password::VERIFY_CALLS.with(|calls| calls.get());

            assert_eq!(known, 1, "{}", scheme);
            assert_eq!(unknown, known, "{}", scheme);
        }
    }

    #[test]
    fn test_login_reports_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        let db = Arc::new(CredentialDatabase::new(&path, 2).unwrap());
        let auth = AuthService::new(db, PasswordScheme::Sha256);
        auth.signup(&alice()).unwrap();

        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("DROP TABLE users;").unwrap();
        drop(conn);

        let err = auth.login("alice", "Secret1!").unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
    }

    #[test]
    fn test_duplicate_username_with_different_email() {
        let auth = service();
        auth.signup(&alice()).unwrap();

        let mut again = alice();
        again.email = "alice2@example.com".into();
        assert!(matches!(auth.signup(&again), Err(AuthError::DuplicateUsername)));
        assert_eq!(auth.database().users.count_users().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_email_with_different_username() {
        let auth = service();
        auth.signup(&alice()).unwrap();

        let mut again = alice();
        again.username = "alice2".into();
        assert!(matches!(auth.signup(&again), Err(AuthError::DuplicateEmail)));
        assert_eq!(auth.database().users.count_users().unwrap(), 1);
    }

    #[test]
    fn test_invalid_email_never_reaches_store() {
        let auth = service();
        let mut user = alice();
        user.email = "not-an-email".into();

        let err = auth.signup(&user).unwrap_err();
        assert!(matches!(err, AuthError::Validation(ValidationError::InvalidEmail)));
        assert_eq!(auth.database().users.count_users().unwrap(), 0);
    }

    #[test]
    fn test_validation_order() {
        let mut user = alice();
        user.place.clear();
        user.email = "bad".into();
        assert_eq!(user.validate(), Err(ValidationError::MissingFields));

        let mut user = alice();
        user.email = "bad".into();
        user.mobile_number = "12".into();
        assert_eq!(user.validate(), Err(ValidationError::InvalidEmail));

        let mut user = alice();
        user.mobile_number = "12".into();
        assert_eq!(user.validate(), Err(ValidationError::InvalidMobileNumber));
    }

    #[test]
    fn test_duplicate_messages_name_the_field() {
        assert!(AuthError::DuplicateUsername.to_string().starts_with("Username"));
        assert!(AuthError::DuplicateEmail.to_string().starts_with("Email"));
    }
}

//! Row types for the credential store

/// Values for a new `users` row. `password_hash` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub place: &'a str,
    pub mobile_number: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    pub total_users: i64,
    pub schema_version: i32,
}

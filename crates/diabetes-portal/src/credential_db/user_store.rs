use std::sync::Arc;

use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use tracing::debug;

use crate::credential_db::schema::NewUserRow;

/// Failures of the credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,

    #[error("email already registered")]
    DuplicateEmail,

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Access to the `users` table. Every call checks a connection out of the
/// pool and returns it when the call finishes.
pub struct UserStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl UserStore {
    pub fn new(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }

    /// Insert a user. Username and email collisions are detected inside the
    /// same write transaction as the insert; a username collision wins when
    /// both fields collide.
    pub fn insert_user(&self, row: &NewUserRow<'_>) -> Result<(), StoreError> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let username_taken = tx
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                [row.username],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if username_taken {
            return Err(StoreError::DuplicateUsername);
        }

        let email_taken = tx
            .query_row("SELECT 1 FROM users WHERE email = ?1", [row.email], |_| Ok(()))
            .optional()?
            .is_some();
        if email_taken {
            return Err(StoreError::DuplicateEmail);
        }

        tx.execute(
            "INSERT INTO users
             (username, password, full_name, place, mobile_number, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.username,
                row.password_hash,
                row.full_name,
                row.place,
                row.mobile_number,
                row.email,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        debug!("Inserted user row for {}", row.username);
        Ok(())
    }

    /// Stored password hash for `username`, if such a user exists.
    pub fn find_password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        let conn = self.get_conn()?;
        let hash = conn
            .query_row(
                "SELECT password FROM users WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    pub fn count_users(&self) -> Result<i64, StoreError> {
        let conn = self.get_conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }
}

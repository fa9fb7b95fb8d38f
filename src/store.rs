// (c) 2025 Ross Younger

//! User credential store
//!
//! A thin wrapper over an embedded [sled] database, keyed by username.
//! Username uniqueness is enforced by the storage layer (compare-and-swap
//! on the key), not by a read-then-write at the call site: of two sessions
//! racing to register the same name, exactly one succeeds.

use std::path::Path;

use thiserror::Error;

/// Credential store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Create refused: the username is taken
    #[error("user '{0}' already exists")]
    UserAlreadyExists(String),
    /// The underlying database reported an error
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
}

/// Handle to the user database. Clones share the same underlying tree and
/// may be used from any task.
#[derive(Debug, Clone)]
pub struct UserStore {
    users: sled::Tree,
}

impl UserStore {
    /// Opens (creating if necessary) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        let users = db.open_tree("users")?;
        Ok(Self { users })
    }

    /// Does this username exist?
    pub fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.users.contains_key(username)?)
    }

    /// Creates a new user, atomically with respect to every other session.
    pub fn create(&self, username: &str, password: &str) -> Result<(), StoreError> {
        self.users
            .compare_and_swap(username, None::<&[u8]>, Some(password.as_bytes()))?
            .map_err(|_| StoreError::UserAlreadyExists(username.to_string()))?;
        self.users.flush()?;
        Ok(())
    }

    /// Checks a password against the stored one for `username`.
    /// An unknown username verifies as false.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        Ok(self
            .users
            .get(username)?
            .is_some_and(|stored| &stored[..] == password.as_bytes()))
    }
}

//! Authentication error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password, unknown user, or a stored password that is not a hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already taken.
    #[error("admin already exists")]
    AdminAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Storage error.
    #[error(transparent)]
    Storage(StorageError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict(_) => Self::AdminAlreadyExists,
            other => Self::Storage(other),
        }
    }
}

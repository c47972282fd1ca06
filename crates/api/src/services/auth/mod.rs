//! Admin authentication.
//!
//! Passwords are stored as Argon2id PHC strings. Accounts created before
//! hashing was introduced hold plaintext and can no longer log in; they must
//! be recreated with `deals-cli admin create`.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use stores_deals_core::{AdminDocument, AdminRole};

use crate::storage::{NewAdmin, Storage};

/// Minimum password length for new admin accounts.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Admin authentication service.
pub struct AdminAuth<'a> {
    storage: &'a Storage,
}

impl<'a> AdminAuth<'a> {
    /// Create a new auth service over the active storage.
    #[must_use]
    pub const fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    /// Returns `AuthError::Storage` if the admin lookup fails.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminDocument, AuthError> {
        let admin = self
            .storage
            .find_admin(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &admin.password).inspect_err(|_| {
            tracing::info!("Admin login rejected");
        })?;

        tracing::info!(admin_id = %admin.id, "Admin logged in");
        Ok(admin.into())
    }

    /// Create an admin account with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::AdminAlreadyExists` if the username is taken.
    pub async fn create_admin(
        &self,
        username: &str,
        password: &str,
        role: AdminRole,
    ) -> Result<String, AuthError> {
        validate_password(password)?;

        let id = self
            .storage
            .create_admin(NewAdmin {
                username: username.to_string(),
                password_hash: hash_password(password)?,
                role,
            })
            .await?;

        tracing::info!(admin_id = %id, username, %role, "Admin created");
        Ok(id)
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or if `hash` is not a
/// PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| {
        tracing::warn!("Stored admin password is not a hash; recreate the account");
        AuthError::InvalidCredentials
    })?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

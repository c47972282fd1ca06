//! Admin account commands.
//!
//! The account is written to whichever storage backend the environment
//! selects (see `DEALS_STORAGE`), the same way the API server resolves it.

use stores_deals_api::Storage;
use stores_deals_api::config::storage_from_env;
use stores_deals_api::services::AdminAuth;
use stores_deals_core::AdminRole;

use super::CommandError;

/// Create a new admin account.
///
/// # Arguments
///
/// * `username` - Login name, unique per backend
/// * `password` - Plaintext password; only its Argon2id hash is stored
/// * `role` - `super_admin` or `admin`
///
/// # Returns
///
/// The ID of the created admin.
pub async fn create_admin(
    username: &str,
    password: &str,
    role: &str,
) -> Result<String, CommandError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;

    let backend = storage_from_env()?;
    tracing::info!(backend = backend.name(), "Connecting to storage...");
    let storage = Storage::connect(&backend).await?;

    tracing::info!("Creating admin: {} ({})", username, role);
    let id = AdminAuth::new(&storage)
        .create_admin(username, password, role)
        .await?;

    tracing::info!("Admin created with ID: {}", id);
    Ok(id)
}

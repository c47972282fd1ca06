//! Database migration commands.
//!
//! # Environment Variables
//!
//! - `DEALS_DATABASE_URL` (or `DATABASE_URL`) - SQLite URL of the relational database
//! - `DEALS_KV_URL` - SQLite URL of the managed key-value database
//!
//! Migration files live in `crates/api/migrations/{relational,kv}/`.

use secrecy::SecretString;

use stores_deals_api::db;

use super::CommandError;

/// Run the relational migrations.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if no database URL is set, or the
/// connection/migration error.
pub async fn relational() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();
    let url = relational_url().ok_or(CommandError::MissingEnvVar("DEALS_DATABASE_URL"))?;
    run_relational(&url).await
}

/// Run the managed key-value migrations.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if `DEALS_KV_URL` is not set, or the
/// connection/migration error.
pub async fn kv() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();
    let url = kv_url().ok_or(CommandError::MissingEnvVar("DEALS_KV_URL"))?;
    run_kv(&url).await
}

/// Run the migrations of every database that has a URL configured.
///
/// # Errors
///
/// Returns `CommandError::MissingEnvVar` if neither URL is set.
pub async fn all() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();
    let relational = relational_url();
    let kv = kv_url();

    if relational.is_none() && kv.is_none() {
        return Err(CommandError::MissingEnvVar(
            "DEALS_DATABASE_URL or DEALS_KV_URL",
        ));
    }
    if let Some(url) = relational {
        run_relational(&url).await?;
    }
    if let Some(url) = kv {
        run_kv(&url).await?;
    }
    Ok(())
}

async fn run_relational(url: &SecretString) -> Result<(), CommandError> {
    tracing::info!("Connecting to relational database...");
    let pool = db::create_pool(url).await?;

    tracing::info!("Running relational migrations...");
    db::migrate_relational(&pool).await?;

    tracing::info!("Relational migrations complete!");
    Ok(())
}

async fn run_kv(url: &SecretString) -> Result<(), CommandError> {
    tracing::info!("Connecting to key-value database...");
    let pool = db::create_pool(url).await?;

    tracing::info!("Running key-value migrations...");
    db::migrate_kv(&pool).await?;

    tracing::info!("Key-value migrations complete!");
    Ok(())
}

fn relational_url() -> Option<SecretString> {
    env("DEALS_DATABASE_URL")
        .or_else(|| env("DATABASE_URL"))
        .map(SecretString::from)
}

fn kv_url() -> Option<SecretString> {
    env("DEALS_KV_URL").map(SecretString::from)
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

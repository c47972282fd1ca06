//! SQLite connection pools and migrations.
//!
//! # Databases
//!
//! - relational: `stores`, `deals`, `footer_link_categories`, `footer_links`, `admins`
//! - managed key-value: `kv_entries`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/{relational,kv}/` and run via:
//! ```bash
//! cargo run -p stores-deals-cli -- migrate all
//! ```

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

/// Migrations for the relational schema.
pub static RELATIONAL_MIGRATOR: Migrator = sqlx::migrate!("./migrations/relational");

/// Migrations for the managed key-value table.
pub static KV_MIGRATOR: Migrator = sqlx::migrate!("./migrations/kv");

/// Create a SQLite connection pool with sensible defaults.
///
/// In-memory URLs get a single long-lived connection, since every SQLite
/// connection to `:memory:` opens its own private database.
///
/// # Arguments
///
/// * `database_url` - SQLite connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10).min_connections(1)
    };

    pool_options
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Apply the relational schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or has been modified after being applied.
pub async fn migrate_relational(pool: &SqlitePool) -> Result<(), MigrateError> {
    RELATIONAL_MIGRATOR.run(pool).await
}

/// Apply the managed key-value migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or has been modified after being applied.
pub async fn migrate_kv(pool: &SqlitePool) -> Result<(), MigrateError> {
    KV_MIGRATOR.run(pool).await
}

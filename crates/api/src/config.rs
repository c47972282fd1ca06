//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Storage (resolved once at startup)
//! - `DEALS_STORAGE` - Force a backend: `relational`, `kv` or `local`
//! - `DEALS_DATABASE_URL` - SQLite URL of the relational database (falls back to `DATABASE_URL`)
//! - `DEALS_KV_URL` - SQLite URL of the managed key-value store
//! - `DEALS_DEV_DATA_DIR` - Directory for local JSON files (default: dev-data)
//!
//! Without `DEALS_STORAGE`, the relational backend wins whenever its URL is
//! present, then the managed key-value store, then local files.
//!
//! ## Optional
//! - `DEALS_HOST` - Bind address (default: 127.0.0.1)
//! - `DEALS_PORT` - Listen port (default: 8787)
//! - `DEALS_STATIC_DIR` - Directory of built front-end assets to serve
//! - `DEALS_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DEV_DATA_DIR: &str = "dev-data";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which persistence service backs the API.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Relational tables (stores, deals, footer links, admins).
    Relational {
        /// SQLite connection URL (may embed credentials for remote drivers)
        database_url: SecretString,
    },
    /// Flat key-value blobs (`stores`, `footerLinks`, `admins`).
    KeyValue(KvBackendConfig),
}

/// Concrete key-value service.
#[derive(Debug, Clone)]
pub enum KvBackendConfig {
    /// Managed key-value table in its own database.
    Managed { url: SecretString },
    /// JSON files in a development directory.
    LocalFiles { dir: PathBuf },
}

impl StorageBackend {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Relational { .. } => "relational",
            Self::KeyValue(KvBackendConfig::Managed { .. }) => "kv",
            Self::KeyValue(KvBackendConfig::LocalFiles { .. }) => "local",
        }
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Selected storage backend
    pub storage: StorageBackend,
    /// Built front-end assets served for non-API paths
    pub static_dir: Option<PathBuf>,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, preview)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or a forced storage
    /// backend is missing its URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("DEALS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DEALS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DEALS_PORT", "8787")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DEALS_PORT".to_string(), e.to_string()))?;
        let storage = storage_from_env()?;

        Ok(Self {
            host,
            port,
            storage,
            static_dir: get_optional_env("DEALS_STATIC_DIR").map(PathBuf::from),
            log_json: get_optional_env("DEALS_LOG_JSON").is_some(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Configuration for tests and embedding: loopback, ephemeral port, no Sentry.
    #[must_use]
    pub const fn with_storage(storage: StorageBackend) -> Self {
        Self {
            host: IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
            port: 0,
            storage,
            static_dir: None,
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Resolve the storage backend from the process environment alone.
///
/// Used by tools that need storage but not the HTTP settings.
///
/// # Errors
///
/// Returns `ConfigError` under the same conditions as [`resolve_storage_backend`].
pub fn storage_from_env() -> Result<StorageBackend, ConfigError> {
    let _ = dotenvy::dotenv();
    resolve_storage_backend(get_optional_env)
}

/// Pick the storage backend from a variable lookup.
///
/// Takes the lookup as a function so the precedence rules can be tested
/// without touching the process environment.
///
/// # Errors
///
/// Returns `ConfigError` for an unknown `DEALS_STORAGE` value or when the
/// forced backend has no URL.
pub fn resolve_storage_backend<F>(lookup: F) -> Result<StorageBackend, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let database_url = lookup("DEALS_DATABASE_URL").or_else(|| lookup("DATABASE_URL"));
    let kv_url = lookup("DEALS_KV_URL");
    let dev_dir =
        || PathBuf::from(lookup("DEALS_DEV_DATA_DIR").unwrap_or_else(|| DEFAULT_DEV_DATA_DIR.to_string()));

    match lookup("DEALS_STORAGE").as_deref().map(str::trim) {
        Some("relational") => database_url
            .map(|url| StorageBackend::Relational {
                database_url: SecretString::from(url),
            })
            .ok_or_else(|| ConfigError::MissingEnvVar("DEALS_DATABASE_URL".to_string())),
        Some("kv") => kv_url
            .map(|url| {
                StorageBackend::KeyValue(KvBackendConfig::Managed {
                    url: SecretString::from(url),
                })
            })
            .ok_or_else(|| ConfigError::MissingEnvVar("DEALS_KV_URL".to_string())),
        Some("local") => Ok(StorageBackend::KeyValue(KvBackendConfig::LocalFiles {
            dir: dev_dir(),
        })),
        Some(other) => Err(ConfigError::InvalidEnvVar(
            "DEALS_STORAGE".to_string(),
            format!("expected relational, kv or local, got '{other}'"),
        )),
        None => Ok(if let Some(url) = database_url {
            StorageBackend::Relational {
                database_url: SecretString::from(url),
            }
        } else if let Some(url) = kv_url {
            StorageBackend::KeyValue(KvBackendConfig::Managed {
                url: SecretString::from(url),
            })
        } else {
            StorageBackend::KeyValue(KvBackendConfig::LocalFiles { dir: dev_dir() })
        }),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

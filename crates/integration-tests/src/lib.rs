//! Integration test harness for the stores.deals API.
//!
//! Each test starts its own server on `127.0.0.1:0` over a fresh backend
//! (in-memory SQLite or a temporary directory) and talks to it over HTTP.
//!
//! ```bash
//! cargo test -p stores-deals-integration-tests
//! ```

use std::net::SocketAddr;

use reqwest::Client;
use secrecy::SecretString;
use tempfile::TempDir;

use stores_deals_api::config::{ApiConfig, KvBackendConfig, StorageBackend};
use stores_deals_api::{AppState, Storage, build_router};

/// A running API server and a client pointed at it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    /// Keeps the local-files directory alive for the server's lifetime.
    pub data_dir: Option<TempDir>,
}

impl TestServer {
    /// Server over JSON files in a temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory or server cannot be set up.
    pub async fn local_files() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let backend = StorageBackend::KeyValue(KvBackendConfig::LocalFiles {
            dir: dir.path().to_path_buf(),
        });
        Self::spawn(backend, Some(dir)).await
    }

    /// Server over the managed key-value table in memory.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be set up.
    pub async fn managed_kv() -> Self {
        let backend = StorageBackend::KeyValue(KvBackendConfig::Managed {
            url: SecretString::from("sqlite::memory:"),
        });
        Self::spawn(backend, None).await
    }

    /// Server over the relational schema in memory.
    ///
    /// # Panics
    ///
    /// Panics if the server cannot be set up.
    pub async fn relational() -> Self {
        let backend = StorageBackend::Relational {
            database_url: SecretString::from("sqlite::memory:"),
        };
        Self::spawn(backend, None).await
    }

    async fn spawn(backend: StorageBackend, data_dir: Option<TempDir>) -> Self {
        let storage = Storage::connect(&backend)
            .await
            .expect("Failed to connect storage");
        storage.migrate().await.expect("Failed to run migrations");

        let app = build_router(AppState::new(ApiConfig::with_storage(backend), storage));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            addr,
            client: Client::new(),
            data_dir,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// GET `path` and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, serde_json::Value) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        let status = resp.status();
        (status, resp.json().await.expect("Response was not JSON"))
    }

    /// POST `body` as JSON and decode the JSON response.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the response is not JSON.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> (reqwest::StatusCode, serde_json::Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        let status = resp.status();
        (status, resp.json().await.expect("Response was not JSON"))
    }
}

//! stores.deals API library.
//!
//! The HTTP service as a library, so the binary, the CLI and the
//! integration tests share one router and one storage layer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

pub use app::build_router;
pub use config::ApiConfig;
pub use state::AppState;
pub use storage::Storage;

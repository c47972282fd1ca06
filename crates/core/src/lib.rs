//! stores.deals Core - Shared types library.
//!
//! This crate provides the types used across all stores.deals components:
//! - `api` - HTTP service serving the aggregate document and admin endpoints
//! - `cli` - Command-line tools for migrations and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed row IDs, deal importance, admin roles and the JSON document shapes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Admin password hashing, login and account creation

pub mod auth;

pub use auth::{AdminAuth, AuthError};

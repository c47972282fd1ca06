//! Core types for stores.deals.
//!
//! This module provides type-safe wrappers for domain concepts and the
//! document shapes exchanged with the front end.

pub mod document;
pub mod id;
pub mod status;

pub use document::*;
pub use id::*;
pub use status::*;

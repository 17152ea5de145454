//! # arclens-core
//!
//! Core types, errors, and defaults for the arclens archival workbench.
//!
//! This crate provides the shared data model (pages, clusters, authority
//! records, reconciliation records) that the other arclens crates operate on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;

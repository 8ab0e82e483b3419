//! Core Service Layer
//!
//! Shared infrastructure for the CMS server: authentication, sessions,
//! configuration, the document store and its HTML views.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod documents;
pub mod error;
pub mod router;
pub mod views;

// Re-exports for convenience
pub use config::{AppState, CmsConfig};
pub use ctx::Ctx;
pub use error::{Error, Result};
pub use router::router;

//! Documents Service
//!
//! Flat-directory document storage, markdown rendering and the HTML
//! endpoints that create, edit, duplicate and delete documents.

pub mod handlers;
pub mod render;
pub mod store;

pub use render::markdown_to_html;
pub use store::{
    content_type_for, DeleteOutcome, Document, DocumentKind, DocumentStore, StoreError, StoreResult,
};

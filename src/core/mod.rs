//! Core library components.
//!
//! Domain resolution, association file retrieval, ownership validation, and
//! the project document mutations that wire links into an app.

pub mod association;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod domains;
pub mod identity;
pub mod manifest;
pub mod project;
pub mod property_list;
pub mod store;
pub mod types;

//! Provider catalog and definition discovery.
//!
//! This module handles:
//! - Walking the search directories for definition files
//! - Priority resolution between same-named definitions
//! - The in-memory catalog of parsed providers

pub mod discovery;
pub mod store;

pub use discovery::Discovery;
pub use store::Catalog;

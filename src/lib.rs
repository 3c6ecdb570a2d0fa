//! Provider store - discovery, parsing and editing of streaming provider definitions.
//!
//! This library provides the provider definition subsystem of the stream viewer, including:
//! - Search path resolution and priority-ordered discovery of definition files
//! - Tolerant parsing of `key:value` definitions into provider records
//! - Round-trip writing that keeps comments and unknown lines intact
//! - URL interceptor rules and the browser profile derived from a record
//!
//! # Example
//!
//! ```no_run
//! use provider_store::config::SearchPaths;
//! use provider_store::context::ProviderContext;
//!
//! let paths = SearchPaths::platform().unwrap();
//! let mut context = ProviderContext::new(paths);
//! context.discover();
//!
//! for provider in context.catalog() {
//!     println!("{}: {}", provider.id, provider.display_name);
//! }
//!
//! let id = "example".parse().unwrap();
//! if let Ok(profile) = context.load_profile(&id) {
//!     if let Some(target) = profile.interceptor.intercept("https://ads.example.com/x") {
//!         println!("redirected to {target}");
//!     }
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod interceptor;
pub mod profile;
pub mod provider;
pub mod writer;

pub use context::{ParseOutcome, ProviderContext};
pub use error::{ProviderError, Result, StatusCode};

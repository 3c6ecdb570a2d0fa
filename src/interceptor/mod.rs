//! URL interceptor rules.
//!
//! This module handles:
//! - Compiling interceptor patterns as whole-URL regular expressions
//! - First-match-wins lookup of the redirect target for a request

pub mod matcher;
pub mod redirect;

pub use matcher::{CompiledLink, compile_links, compile_pattern, find_matching_link};
pub use redirect::UrlInterceptor;

//! Provider definitions.
//!
//! This module handles:
//! - The provider data model
//! - The fixed directive set of definition files
//! - Tolerant line-by-line parsing with all-or-nothing validation

pub mod color;
pub mod directive;
pub mod parser;
pub mod types;

pub use color::Color;
pub use directive::Directive;
pub use parser::{parse_definition_file, parse_definition_str};
pub use types::{
	DEFINITION_EXTENSION, Icon, InjectionPoint, InterceptorLink, PLACEHOLDER_URL, ProviderId,
	ProviderRecord, Script, TitleBar,
};

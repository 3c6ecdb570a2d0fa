use crate::error::{ProviderError, Result};
use crate::provider::types::InterceptorLink;
use regex::Regex;

/// An interceptor link with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledLink {
	/// The original link.
	pub link: InterceptorLink,

	/// Pattern anchored to the whole URL.
	pub regex: Regex,
}

impl CompiledLink {
	pub fn new(link: &InterceptorLink) -> Result<Self> {
		Ok(CompiledLink {
			link: link.clone(),
			regex: compile_pattern(&link.pattern)?,
		})
	}

	/// Check if the whole of `url` matches this link's pattern.
	pub fn matches(&self, url: &str) -> bool {
		self.regex.is_match(url)
	}

	pub fn target(&self) -> &str {
		&self.link.target
	}
}

/// Compile an interceptor pattern so it only matches complete URLs.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
	Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ProviderError::InvalidRegex {
		pattern: pattern.to_string(),
		source,
	})
}

/// Compile all links, keeping their order.
pub fn compile_links(links: &[InterceptorLink]) -> Result<Vec<CompiledLink>> {
	links.iter().map(CompiledLink::new).collect()
}

/// Find the first link whose pattern matches `url`.
pub fn find_matching_link<'a>(links: &'a [CompiledLink], url: &str) -> Option<&'a CompiledLink> {
	links.iter().find(|link| link.matches(url))
}

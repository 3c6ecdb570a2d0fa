use crate::error::Result;
use crate::interceptor::matcher::{CompiledLink, compile_links, find_matching_link};
use crate::provider::types::ProviderRecord;
use tracing::debug;

/// Request interceptor handed to the browser for one provider.
///
/// A disabled interceptor never redirects, whatever links the record carries.
#[derive(Debug, Clone, Default)]
pub struct UrlInterceptor {
	enabled: bool,
	links: Vec<CompiledLink>,
}

impl UrlInterceptor {
	/// Build the interceptor for `record`, compiling its links in order.
	pub fn from_record(record: &ProviderRecord) -> Result<Self> {
		if !record.url_interceptor_enabled {
			return Ok(Self::disabled());
		}
		Ok(UrlInterceptor {
			enabled: true,
			links: compile_links(&record.interceptor_links)?,
		})
	}

	pub fn disabled() -> Self {
		Self::default()
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn links(&self) -> &[CompiledLink] {
		&self.links
	}

	/// Redirect target for a request to `url`, if any link matches.
	pub fn intercept(&self, url: &str) -> Option<&str> {
		if !self.enabled {
			return None;
		}
		let link = find_matching_link(&self.links, url)?;
		debug!(url, redirect = link.target(), pattern = %link.link.pattern, "intercepted request");
		Some(link.target())
	}
}

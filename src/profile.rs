use crate::error::Result;
use crate::interceptor::UrlInterceptor;
use crate::provider::types::{InjectionPoint, PLACEHOLDER_URL, ProviderRecord, TitleBar};
use std::path::{Path, PathBuf};

/// Profile id used when no provider is loaded.
pub const FALLBACK_PROFILE_ID: &str = "Default";

/// A script ready for injection, with its path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScript {
	pub path: PathBuf,
	pub injection_point: InjectionPoint,
}

/// Everything the browser component needs to open a provider.
///
/// The profile id keys the browser's cookie and storage location; the
/// browser owns that state, this type only names it.
#[derive(Debug, Clone)]
pub struct BrowserProfile {
	pub profile_id: String,

	pub url: String,

	/// Window title before any page sets one.
	pub title: String,

	/// True when `title` must not be replaced by page titles.
	pub permanent_title: bool,

	pub title_bar: TitleBar,

	pub icon: Option<PathBuf>,

	/// `None` keeps the browser's own user agent.
	pub user_agent: Option<String>,

	pub scripts: Vec<ResolvedScript>,

	pub interceptor: UrlInterceptor,
}

impl BrowserProfile {
	/// Derive the profile for `record`.
	///
	/// Fails only when an interceptor pattern does not compile.
	pub fn from_record(record: &ProviderRecord) -> Result<Self> {
		let url = if record.url.is_empty() {
			PLACEHOLDER_URL.to_string()
		} else {
			record.url.clone()
		};

		Ok(BrowserProfile {
			profile_id: record.id.to_string(),
			url,
			title: record.base_title().to_string(),
			permanent_title: record.title_bar.permanent_title.is_some(),
			title_bar: record.title_bar.clone(),
			icon: record.icon.resolved.clone(),
			user_agent: (!record.user_agent.is_empty()).then(|| record.user_agent.clone()),
			scripts: record
				.scripts
				.iter()
				.map(|script| ResolvedScript {
					path: resolve_script(&script.filename, &record.source_dir),
					injection_point: script.injection_point,
				})
				.collect(),
			interceptor: UrlInterceptor::from_record(record)?,
		})
	}

	/// The profile shown when no provider is selected.
	pub fn fallback(title: &str) -> Self {
		BrowserProfile {
			profile_id: FALLBACK_PROFILE_ID.to_string(),
			url: PLACEHOLDER_URL.to_string(),
			title: title.to_string(),
			permanent_title: false,
			title_bar: TitleBar::default(),
			icon: None,
			user_agent: None,
			scripts: Vec::new(),
			interceptor: UrlInterceptor::disabled(),
		}
	}
}

fn resolve_script(filename: &str, source_dir: &Path) -> PathBuf {
	let path = Path::new(filename);
	if path.is_absolute() {
		path.to_path_buf()
	} else {
		source_dir.join(path)
	}
}

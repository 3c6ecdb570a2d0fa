use crate::error::{ProviderError, Result};
use crate::provider::color::Color;
use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File extension of provider definition files (without the dot).
pub const DEFINITION_EXTENSION: &str = "p";

/// Start URL used when a record has none.
pub const PLACEHOLDER_URL: &str = "about:blank";

/// Identifier of a provider.
///
/// Derived from the definition file stem; doubles as the browsing profile id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderId(String);

impl ProviderId {
	/// Generate a fresh random identifier (eight two-digit hex groups).
	pub fn random() -> Self {
		let mut rng = rand::thread_rng();
		let id = (0..8)
			.map(|_| format!("{:02x}", rng.gen_range(0x0a_u8..=0x63)))
			.collect::<String>();
		ProviderId(id)
	}

	/// Derive the identifier from a definition file path.
	pub fn from_path(path: &Path) -> Option<Self> {
		path.file_stem()
			.and_then(|stem| stem.to_str())
			.and_then(|stem| stem.parse().ok())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// File name of the definition backing this id.
	pub fn file_name(&self) -> String {
		format!("{}.{}", self.0, DEFINITION_EXTENSION)
	}
}

impl FromStr for ProviderId {
	type Err = ProviderError;

	fn from_str(s: &str) -> Result<Self> {
		let valid = !s.is_empty()
			&& !s.starts_with('.')
			&& !s.chars().any(|c| matches!(c, '/' | '\\' | ':' | '\0') || c.is_control());
		if valid {
			Ok(ProviderId(s.to_string()))
		} else {
			Err(ProviderError::InvalidId { id: s.to_string() })
		}
	}
}

impl fmt::Display for ProviderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for ProviderId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Provider icon as written by the author and as found on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Icon {
	/// Author-supplied path, absolute or relative to the source directory.
	pub raw: String,

	/// Existing image file the raw value points at.
	pub resolved: Option<PathBuf>,
}

impl Icon {
	/// Resolve `raw` against `base_dir`; a missing file leaves `resolved` empty.
	pub fn resolve(raw: &str, base_dir: &Path) -> Self {
		if raw.is_empty() {
			return Icon::default();
		}
		let candidate = if Path::new(raw).is_absolute() {
			PathBuf::from(raw)
		} else {
			base_dir.join(raw)
		};
		Icon {
			raw: raw.to_string(),
			resolved: candidate.is_file().then_some(candidate),
		}
	}
}

/// Title-bar styling of the browser window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleBar {
	pub visible: bool,

	/// Title shown instead of the page title.
	pub permanent_title: Option<String>,

	pub background: Color,

	pub text: Color,
}

impl Default for TitleBar {
	fn default() -> Self {
		TitleBar {
			visible: false,
			permanent_title: None,
			background: Color::DARK_GRAY,
			text: Color::WHITE,
		}
	}
}

/// A URL rewrite rule: requests matching `pattern` are redirected to `target`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptorLink {
	/// Regular expression that must match the whole request URL.
	pub pattern: String,

	pub target: String,
}

impl InterceptorLink {
	pub fn new(pattern: impl Into<String>, target: impl Into<String>) -> Self {
		InterceptorLink {
			pattern: pattern.into(),
			target: target.into(),
		}
	}

	pub fn is_complete(&self) -> bool {
		!self.pattern.is_empty() && !self.target.is_empty()
	}
}

/// Page lifecycle stage at which a script is injected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InjectionPoint {
	#[default]
	Automatic,
	Deferred,
	DocumentReady,
	DocumentCreation,
}

impl InjectionPoint {
	/// Parse an injection mode alias. Returns `None` for unknown modes.
	pub fn from_alias(alias: &str) -> Option<Self> {
		let alias = alias.trim().to_ascii_lowercase();
		match alias.as_str() {
			"" | "auto" | "automatic" => Some(InjectionPoint::Automatic),
			"defer" | "deferr" | "deferred" => Some(InjectionPoint::Deferred),
			"ready" | "docready" | "documentready" => Some(InjectionPoint::DocumentReady),
			"create" | "creation" | "doccreate" | "doccreation" | "documentcreation" => {
				Some(InjectionPoint::DocumentCreation)
			}
			_ => None,
		}
	}

	/// Short alias used when writing definitions.
	pub fn as_str(&self) -> &'static str {
		match self {
			InjectionPoint::Automatic => "auto",
			InjectionPoint::Deferred => "defer",
			InjectionPoint::DocumentReady => "ready",
			InjectionPoint::DocumentCreation => "create",
		}
	}
}

impl fmt::Display for InjectionPoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A user script injected into pages of the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
	pub filename: String,
	pub injection_point: InjectionPoint,
}

impl Script {
	pub fn new(filename: impl Into<String>, injection_point: InjectionPoint) -> Self {
		Script {
			filename: filename.into(),
			injection_point,
		}
	}

	/// Parse a `filename[,mode]` value.
	///
	/// Unknown modes fall back to [`InjectionPoint::Automatic`]; an empty
	/// filename yields `None`.
	pub fn parse(value: &str) -> Option<Self> {
		let mut parts = value.split(',').map(str::trim).filter(|p| !p.is_empty());
		let filename = parts.next()?;
		let injection_point = match parts.next() {
			Some(mode) => InjectionPoint::from_alias(mode).unwrap_or_else(|| {
				tracing::warn!(script = filename, mode, "unknown script mode, using auto");
				InjectionPoint::Automatic
			}),
			None => InjectionPoint::Automatic,
		};
		Some(Script::new(filename, injection_point))
	}
}

impl fmt::Display for Script {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.injection_point {
			InjectionPoint::Automatic => f.write_str(&self.filename),
			point => write!(f, "{},{}", self.filename, point),
		}
	}
}

/// A parsed provider definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRecord {
	pub id: ProviderId,

	/// Directory the definition file was loaded from (or will be written to).
	pub source_dir: PathBuf,

	/// True when the definition does not live in the user-writable directory.
	pub is_system_provided: bool,

	pub display_name: String,

	pub icon: Icon,

	pub url: String,

	pub url_interceptor_enabled: bool,

	/// Empty means "use the browser default".
	pub user_agent: String,

	pub title_bar: TitleBar,

	/// Rewrite rules, first match wins.
	pub interceptor_links: Vec<InterceptorLink>,

	/// Scripts in injection order; filenames are unique.
	pub scripts: Vec<Script>,
}

impl ProviderRecord {
	/// Create a record with default values for `id`, located in `source_dir`.
	pub fn new(id: ProviderId, source_dir: impl Into<PathBuf>) -> Self {
		ProviderRecord {
			id,
			source_dir: source_dir.into(),
			is_system_provided: false,
			display_name: String::new(),
			icon: Icon::default(),
			url: PLACEHOLDER_URL.to_string(),
			url_interceptor_enabled: true,
			user_agent: String::new(),
			title_bar: TitleBar::default(),
			interceptor_links: Vec::new(),
			scripts: Vec::new(),
		}
	}

	/// Path of the definition file backing this record.
	pub fn definition_path(&self) -> PathBuf {
		self.source_dir.join(self.id.file_name())
	}

	/// Title the browser window starts with.
	pub fn base_title(&self) -> &str {
		self.title_bar
			.permanent_title
			.as_deref()
			.unwrap_or(&self.display_name)
	}

	/// Append `script` unless a script with the same filename exists.
	///
	/// Returns false when the script was dropped as a duplicate.
	pub fn add_script(&mut self, script: Script) -> bool {
		if self.scripts.iter().any(|s| s.filename == script.filename) {
			return false;
		}
		self.scripts.push(script);
		true
	}

	/// Problems that prevent this record from being stored.
	pub fn validation_problems(&self) -> Vec<String> {
		let mut problems = Vec::new();
		if self.display_name.is_empty() {
			problems.push("field 'name' must not be empty".to_string());
		}
		if self.url.is_empty() {
			problems.push("field 'url' must not be empty".to_string());
		}
		for (i, link) in self.interceptor_links.iter().enumerate() {
			if !link.is_complete() {
				problems.push(format!(
					"url interceptor #{} needs both a pattern and a target",
					i + 1
				));
			}
		}

		let mut values = vec![
			("name", self.display_name.as_str()),
			("icon", self.icon.raw.as_str()),
			("url", self.url.as_str()),
			("user-agent", self.user_agent.as_str()),
		];
		if let Some(ref title) = self.title_bar.permanent_title {
			values.push(("titlebar-text", title.as_str()));
		}
		for link in &self.interceptor_links {
			values.push(("urlInterceptorPattern", link.pattern.as_str()));
			values.push(("urlInterceptorTarget", link.target.as_str()));
		}
		for script in &self.scripts {
			values.push(("script", script.filename.as_str()));
		}
		for (field, value) in values {
			if value.contains(['\r', '\n']) {
				problems.push(format!("field '{field}' must not contain a line break"));
			}
		}

		for (i, script) in self.scripts.iter().enumerate() {
			if script.filename.trim().is_empty() || script.filename.contains(',') {
				problems.push(format!("script '{}' has an invalid filename", script.filename));
			}
			if self.scripts[..i].iter().any(|s| s.filename == script.filename) {
				problems.push(format!("script '{}' is listed twice", script.filename));
			}
		}
		problems
	}
}

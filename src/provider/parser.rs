use crate::error::{ProviderError, Result};
use crate::provider::color::Color;
use crate::provider::directive::{Directive, Line, classify, parse_bool, simplify};
use crate::provider::types::{Icon, InterceptorLink, ProviderId, ProviderRecord, Script};
use std::path::Path;
use tracing::{debug, warn};

/// Parse a provider definition file from the given path.
///
/// `user_dir` is the user-writable provider directory; definitions outside
/// of it are flagged as system provided.
pub fn parse_definition_file(path: &Path, user_dir: &Path) -> Result<ProviderRecord> {
	let content = std::fs::read_to_string(path).map_err(|source| ProviderError::ReadError {
		path: path.to_path_buf(),
		source,
	})?;

	parse_definition_str(&content, path, user_dir)
}

/// Parse a provider definition from a string (useful for testing).
///
/// Individual bad lines are logged and skipped. Validation runs once the
/// whole file was scanned and rejects the definition as a unit.
pub fn parse_definition_str(content: &str, path: &Path, user_dir: &Path) -> Result<ProviderRecord> {
	if content.trim().is_empty() {
		return Err(ProviderError::EmptyFile {
			path: path.to_path_buf(),
		});
	}

	let id = ProviderId::from_path(path).ok_or_else(|| ProviderError::InvalidId {
		id: path.display().to_string(),
	})?;
	let source_dir = path.parent().unwrap_or_else(|| Path::new("")).to_path_buf();

	let mut record = ProviderRecord::new(id, source_dir);
	record.is_system_provided = !path.starts_with(user_dir);
	debug!(id = %record.id, dir = %record.source_dir.display(), "parsing provider definition");

	let mut url = None;

	for line in content.lines() {
		let (directive, raw) = match classify(line) {
			Line::Blank | Line::Comment => continue,
			Line::Unknown(key) => {
				warn!(path = %path.display(), key, "unknown option skipped");
				continue;
			}
			Line::Directive { directive, value } => (directive, value),
		};
		let value = simplify(raw);

		match directive {
			Directive::Name => record.display_name = value,
			Directive::Icon => record.icon = Icon::resolve(&value, &record.source_dir),
			Directive::Url => url = Some(value),
			Directive::UrlInterceptor => record.url_interceptor_enabled = parse_bool(&value),
			Directive::UserAgent => record.user_agent = value,
			Directive::TitleBar => record.title_bar.visible = parse_bool(&value),
			Directive::TitleBarText => record.title_bar.permanent_title = Some(value),
			Directive::TitleBarColor => {
				record.title_bar.background = Color::parse_or(&value, record.title_bar.background)
			}
			Directive::TitleBarTextColor => {
				record.title_bar.text = Color::parse_or(&value, record.title_bar.text)
			}
			Directive::InterceptorPattern => {
				debug!(path = %path.display(), pattern = %value, "found url interceptor pattern");
				record.interceptor_links.push(InterceptorLink::new(value, ""));
			}
			Directive::InterceptorTarget => match record.interceptor_links.last_mut() {
				Some(link) if !link.pattern.is_empty() && link.target.is_empty() => {
					debug!(path = %path.display(), redirect = %value, "paired url interceptor target");
					link.target = value;
				}
				_ => warn!(
					path = %path.display(),
					redirect = %value,
					"url interceptor target without an open pattern skipped"
				),
			},
			Directive::Script => match Script::parse(&value) {
				Some(script) => {
					let name = script.filename.clone();
					if record.add_script(script) {
						debug!(path = %path.display(), script = %name, "loaded script");
					} else {
						warn!(path = %path.display(), script = %value, "duplicate script skipped");
					}
				}
				None => warn!(path = %path.display(), "script line without a filename skipped"),
			},
		}
	}

	let url_missing = url.is_none();
	if let Some(url) = url {
		record.url = url;
	}

	if record.icon.resolved.is_none() {
		debug!(path = %path.display(), "icon not found, falling back to text name");
	}

	let mut problems = record.validation_problems();
	if url_missing {
		problems.push("field 'url' is missing".to_string());
	}

	if !problems.is_empty() {
		for problem in &problems {
			warn!(path = %path.display(), "{problem}");
		}
		return Err(ProviderError::InvalidDefinition {
			path: path.to_path_buf(),
			problems,
		});
	}

	Ok(record)
}

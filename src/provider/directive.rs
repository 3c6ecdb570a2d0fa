//! The fixed set of `key:value` directives understood in definition files.
//!
//! Both the parser and the writer classify lines through [`classify`], so a
//! line the parser reads as a directive is exactly the line the writer patches.

/// A recognized directive key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
	Name,
	Icon,
	Url,
	UrlInterceptor,
	InterceptorPattern,
	InterceptorTarget,
	Script,
	UserAgent,
	TitleBar,
	TitleBarText,
	TitleBarColor,
	TitleBarTextColor,
}

impl Directive {
	/// All directives, in the canonical order used for fresh files.
	pub const CANONICAL_ORDER: [Directive; 12] = [
		Directive::Name,
		Directive::Icon,
		Directive::Url,
		Directive::UrlInterceptor,
		Directive::InterceptorPattern,
		Directive::InterceptorTarget,
		Directive::Script,
		Directive::UserAgent,
		Directive::TitleBar,
		Directive::TitleBarText,
		Directive::TitleBarColor,
		Directive::TitleBarTextColor,
	];

	/// The key as written in definition files.
	pub fn key(&self) -> &'static str {
		match self {
			Directive::Name => "name",
			Directive::Icon => "icon",
			Directive::Url => "url",
			Directive::UrlInterceptor => "urlInterceptor",
			Directive::InterceptorPattern => "urlInterceptorPattern",
			Directive::InterceptorTarget => "urlInterceptorTarget",
			Directive::Script => "script",
			Directive::UserAgent => "user-agent",
			Directive::TitleBar => "titlebar",
			Directive::TitleBarText => "titlebar-text",
			Directive::TitleBarColor => "titlebar-color",
			Directive::TitleBarTextColor => "titlebar-text-color",
		}
	}

	/// Look up a directive by key, ignoring ASCII case.
	pub fn from_key(key: &str) -> Option<Self> {
		Self::CANONICAL_ORDER
			.into_iter()
			.find(|d| d.key().eq_ignore_ascii_case(key))
	}

	/// Directives that may appear any number of times.
	pub fn is_stackable(&self) -> bool {
		matches!(
			self,
			Directive::InterceptorPattern | Directive::InterceptorTarget | Directive::Script
		)
	}

	/// Render a line for this directive.
	pub fn line(&self, value: &str) -> String {
		format!("{}:{}", self.key(), value)
	}
}

/// Classification of a single definition file line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
	Blank,
	Comment,
	/// A recognized directive; `value` is the raw text after the colon.
	Directive { directive: Directive, value: &'a str },
	/// A `key:value` line with an unrecognized key, or a line without a colon.
	Unknown(&'a str),
}

/// Classify one line. Leading whitespace before the key is ignored.
pub fn classify(line: &str) -> Line<'_> {
	let trimmed = line.trim_start();
	if trimmed.trim_end().is_empty() {
		return Line::Blank;
	}
	if trimmed.starts_with('#') {
		return Line::Comment;
	}
	match trimmed.split_once(':') {
		Some((key, value)) => match Directive::from_key(key) {
			Some(directive) => Line::Directive { directive, value },
			None => Line::Unknown(key),
		},
		None => Line::Unknown(trimmed.trim_end()),
	}
}

/// Trim `value` and collapse inner whitespace runs to a single space.
pub fn simplify(value: &str) -> String {
	value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Boolean coercion: `true` (any case) or `1` is true, anything else false.
pub fn parse_bool(value: &str) -> bool {
	let value = value.trim();
	value.eq_ignore_ascii_case("true") || value == "1"
}

pub fn format_bool(value: bool) -> &'static str {
	if value { "true" } else { "false" }
}

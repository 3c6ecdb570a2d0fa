use crate::provider::color::Color;
use crate::provider::directive::{Directive, format_bool, parse_bool, simplify};
use crate::provider::types::{ProviderRecord, Script};

/// Value written for a single-valued directive.
///
/// `None` means the directive must not appear at all. Stackable directives
/// always return `None`; they are rendered by [`directive_lines`].
pub(crate) fn scalar_value(directive: Directive, record: &ProviderRecord) -> Option<String> {
	let title_bar = &record.title_bar;
	match directive {
		Directive::Name => Some(record.display_name.clone()),
		Directive::Icon => Some(record.icon.raw.clone()),
		Directive::Url => Some(record.url.clone()),
		Directive::UrlInterceptor => Some(format_bool(record.url_interceptor_enabled).to_string()),
		Directive::UserAgent => Some(record.user_agent.clone()),
		Directive::TitleBar => Some(format_bool(title_bar.visible).to_string()),
		Directive::TitleBarText => title_bar.permanent_title.clone(),
		Directive::TitleBarColor => Some(title_bar.background.to_string()),
		Directive::TitleBarTextColor => Some(title_bar.text.to_string()),
		Directive::InterceptorPattern | Directive::InterceptorTarget | Directive::Script => None,
	}
}

/// Whether omitting `directive` from a file yields the same record value.
pub(crate) fn is_default(directive: Directive, record: &ProviderRecord) -> bool {
	let title_bar = &record.title_bar;
	match directive {
		Directive::Name | Directive::Url => false,
		Directive::Icon => record.icon.raw.is_empty(),
		Directive::UrlInterceptor => record.url_interceptor_enabled,
		Directive::UserAgent => record.user_agent.is_empty(),
		Directive::TitleBar => !title_bar.visible,
		Directive::TitleBarText => title_bar.permanent_title.is_none(),
		Directive::TitleBarColor => title_bar.background == Color::DARK_GRAY,
		Directive::TitleBarTextColor => title_bar.text == Color::WHITE,
		Directive::InterceptorPattern | Directive::InterceptorTarget => {
			record.interceptor_links.is_empty()
		}
		Directive::Script => record.scripts.is_empty(),
	}
}

/// Whether an existing raw line value already means `value` for `directive`.
pub(crate) fn same_value(directive: Directive, raw: &str, value: &str) -> bool {
	let old = simplify(raw);
	match directive {
		Directive::UrlInterceptor | Directive::TitleBar => parse_bool(&old) == parse_bool(value),
		Directive::TitleBarColor | Directive::TitleBarTextColor => {
			match (old.parse::<Color>(), value.parse::<Color>()) {
				(Ok(a), Ok(b)) => a == b,
				_ => old == value,
			}
		}
		Directive::Script => Script::parse(&old) == Script::parse(value),
		_ => old == value,
	}
}

/// Lines emitted for `directive` when it is written from scratch.
///
/// Pattern lines carry their target line right after them; the target
/// directive itself renders nothing.
pub(crate) fn directive_lines(directive: Directive, record: &ProviderRecord) -> Vec<String> {
	match directive {
		Directive::InterceptorPattern => record
			.interceptor_links
			.iter()
			.flat_map(|link| {
				[
					Directive::InterceptorPattern.line(&link.pattern),
					Directive::InterceptorTarget.line(&link.target),
				]
			})
			.collect(),
		Directive::InterceptorTarget => Vec::new(),
		Directive::Script => record
			.scripts
			.iter()
			.map(|script| Directive::Script.line(&script.to_string()))
			.collect(),
		scalar if !is_default(scalar, record) => scalar_value(scalar, record)
			.map(|value| vec![scalar.line(&value)])
			.unwrap_or_default(),
		_ => Vec::new(),
	}
}

/// Render a fresh definition file in canonical field order.
pub fn render_definition(record: &ProviderRecord) -> String {
	Directive::CANONICAL_ORDER
		.into_iter()
		.flat_map(|directive| directive_lines(directive, record))
		.map(|line| line + "\n")
		.collect()
}

use crate::provider::directive::{Directive, Line, classify, simplify};
use crate::provider::types::{InterceptorLink, ProviderRecord, Script};
use crate::writer::layout::{directive_lines, same_value, scalar_value};
use std::collections::HashSet;

/// Patch existing definition `content` so it describes `record`.
///
/// Recognized lines get their value replaced in place; comments, blank lines,
/// unknown lines and line order are kept. Directives missing from the file
/// are appended when they carry a non-default value. Stackable directives
/// the parser skips (duplicate scripts, orphan targets) do not count. A
/// stackable list equal to the file's is left alone; one of the same length
/// is patched positionally; otherwise all old lines of that kind are dropped
/// and the current set is appended.
pub(crate) fn patch_definition(content: &str, record: &ProviderRecord) -> String {
	let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
	let mut lines: Vec<String> = content
		.split('\n')
		.map(|line| match newline {
			"\r\n" => line.strip_suffix('\r').unwrap_or(line),
			_ => line,
		})
		.map(str::to_string)
		.collect();

	let directives: Vec<(usize, Directive)> = lines
		.iter()
		.enumerate()
		.filter_map(|(i, line)| match classify(line) {
			Line::Directive { directive, .. } => Some((i, directive)),
			_ => None,
		})
		.collect();

	let seen: HashSet<Directive> = directives.iter().map(|(_, d)| *d).collect();
	let positions = |kind: Directive| -> Vec<usize> {
		directives
			.iter()
			.filter(|(_, d)| *d == kind)
			.map(|(i, _)| *i)
			.collect()
	};
	let mut dropped: HashSet<usize> = HashSet::new();

	for &(i, directive) in directives.iter().filter(|(_, d)| !d.is_stackable()) {
		match scalar_value(directive, record) {
			Some(value) => patch_line(&mut lines[i], directive, &value),
			None => {
				dropped.insert(i);
			}
		}
	}

	let stacked = Stackables::scan(&lines);

	let links = &record.interceptor_links;
	let reappend_links = if stacked.links().as_ref() == Some(links) {
		false
	} else if stacked.patterns.len() == links.len() && stacked.targets.len() == links.len() {
		for (((p, _), (t, _)), link) in stacked.patterns.iter().zip(&stacked.targets).zip(links) {
			patch_line(&mut lines[*p], Directive::InterceptorPattern, &link.pattern);
			patch_line(&mut lines[*t], Directive::InterceptorTarget, &link.target);
		}
		dropped.extend(&stacked.ignored_targets);
		false
	} else {
		dropped.extend(positions(Directive::InterceptorPattern));
		dropped.extend(positions(Directive::InterceptorTarget));
		true
	};

	let reappend_scripts = if stacked.scripts() == record.scripts {
		false
	} else if stacked.scripts.len() == record.scripts.len() {
		for ((i, _), script) in stacked.scripts.iter().zip(&record.scripts) {
			patch_line(&mut lines[*i], Directive::Script, &script.to_string());
		}
		dropped.extend(&stacked.ignored_scripts);
		false
	} else {
		dropped.extend(positions(Directive::Script));
		true
	};

	let appended: Vec<String> = Directive::CANONICAL_ORDER
		.into_iter()
		.filter(|directive| match directive {
			Directive::InterceptorPattern => reappend_links,
			Directive::InterceptorTarget => false,
			Directive::Script => reappend_scripts,
			scalar => !seen.contains(scalar),
		})
		.flat_map(|directive| directive_lines(directive, record))
		.collect();

	let mut kept: Vec<String> = lines
		.into_iter()
		.enumerate()
		.filter(|(i, _)| !dropped.contains(i))
		.map(|(_, line)| line)
		.collect();

	if !appended.is_empty() {
		// keep a trailing newline trailing
		let at = match kept.last() {
			Some(last) if last.is_empty() => kept.len() - 1,
			_ => kept.len(),
		};
		let tail = kept.split_off(at);
		kept.extend(appended);
		kept.extend(tail);
	}

	kept.join(newline)
}

/// Stackable lines of a file split into the ones the parser turns into
/// record entries and the ones it skips.
#[derive(Default)]
struct Stackables {
	patterns: Vec<(usize, String)>,
	targets: Vec<(usize, String)>,
	ignored_targets: Vec<usize>,
	scripts: Vec<(usize, Script)>,
	ignored_scripts: Vec<usize>,
}

impl Stackables {
	/// Apply the parser's acceptance rules: a target pairs with the latest
	/// open pattern, and only the first script per filename counts.
	fn scan(lines: &[String]) -> Self {
		let mut stacked = Stackables::default();
		let mut open_pattern = false;

		for (i, line) in lines.iter().enumerate() {
			let Line::Directive { directive, value } = classify(line) else {
				continue;
			};
			let value = simplify(value);
			match directive {
				Directive::InterceptorPattern => {
					open_pattern = !value.is_empty();
					stacked.patterns.push((i, value));
				}
				Directive::InterceptorTarget if open_pattern => {
					open_pattern = value.is_empty();
					stacked.targets.push((i, value));
				}
				Directive::InterceptorTarget => stacked.ignored_targets.push(i),
				Directive::Script => match Script::parse(&value) {
					Some(script)
						if !stacked
							.scripts
							.iter()
							.any(|(_, s)| s.filename == script.filename) =>
					{
						stacked.scripts.push((i, script))
					}
					_ => stacked.ignored_scripts.push(i),
				},
				_ => {}
			}
		}
		stacked
	}

	/// Links as the parser would build them; `None` when a pattern is unpaired.
	fn links(&self) -> Option<Vec<InterceptorLink>> {
		if self.patterns.len() != self.targets.len() {
			return None;
		}
		let links = self
			.patterns
			.iter()
			.zip(&self.targets)
			.map(|((_, pattern), (_, target))| InterceptorLink::new(pattern.as_str(), target.as_str()))
			.collect();
		Some(links)
	}

	fn scripts(&self) -> Vec<Script> {
		self.scripts.iter().map(|(_, s)| s.clone()).collect()
	}
}

/// Replace the value of a directive line unless it already holds `value`.
fn patch_line(line: &mut String, directive: Directive, value: &str) {
	let replaced = match classify(line) {
		Line::Directive { value: raw, .. } if !same_value(directive, raw, value) => {
			Some(replace_value(line, raw, value))
		}
		_ => None,
	};
	if let Some(replaced) = replaced {
		*line = replaced;
	}
}

/// Swap the value part of `line`, keeping the key and the spacing after the colon.
fn replace_value(line: &str, raw_value: &str, value: &str) -> String {
	let value_start = line.len() - raw_value.len();
	let padding = raw_value.len() - raw_value.trim_start().len();
	format!("{}{}", &line[..value_start + padding], value)
}

use crate::config::SearchPaths;
use crate::provider::types::{DEFINITION_EXTENSION, ProviderId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Nesting limit for the recursive walk; guards against symlink cycles.
const MAX_DEPTH: usize = 16;

/// Index of definition files across all search directories.
///
/// Paths are recorded per search directory in priority order, so later
/// entries shadow earlier ones with the same file stem.
#[derive(Debug, Clone)]
pub struct Discovery {
	search_dirs: Vec<PathBuf>,
	found: Vec<PathBuf>,
}

impl Discovery {
	pub fn new(paths: &SearchPaths) -> Self {
		Discovery {
			search_dirs: paths.search_dirs().into_iter().map(Path::to_path_buf).collect(),
			found: Vec::new(),
		}
	}

	/// Walk every search directory and record all definition files.
	///
	/// Replaces the previous index. Empty directories are not an error.
	pub fn find_all(&mut self) -> &[PathBuf] {
		self.found.clear();

		for dir in &self.search_dirs {
			let mut current = Vec::new();
			collect_definitions(dir, 0, &mut current);
			current.sort();
			debug!(dir = %dir.display(), count = current.len(), "scanned provider directory");
			self.found.extend(current);
		}

		&self.found
	}

	/// All recorded definition paths, lowest priority first.
	pub fn paths(&self) -> &[PathBuf] {
		&self.found
	}

	/// The highest-priority definition path for `id`.
	pub fn resolve(&self, id: &ProviderId) -> Option<&Path> {
		self.found
			.iter()
			.rev()
			.find(|path| ProviderId::from_path(path).as_ref() == Some(id))
			.map(PathBuf::as_path)
	}

	/// Distinct provider ids in discovery order.
	pub fn ids(&self) -> Vec<ProviderId> {
		let mut ids: Vec<ProviderId> = Vec::new();
		for id in self.found.iter().filter_map(|p| ProviderId::from_path(p)) {
			if !ids.contains(&id) {
				ids.push(id);
			}
		}
		ids
	}

	/// Record a definition file written after the last walk.
	pub(crate) fn record(&mut self, path: &Path) {
		if !self.found.iter().any(|p| p == path) {
			self.found.push(path.to_path_buf());
		}
	}

	/// Drop a definition file that no longer exists.
	pub(crate) fn forget(&mut self, path: &Path) {
		self.found.retain(|p| p != path);
	}
}

fn collect_definitions(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
	if depth > MAX_DEPTH {
		warn!(dir = %dir.display(), "provider directory nested too deeply, skipped");
		return;
	}

	let entries = match std::fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(e) => {
			warn!(dir = %dir.display(), error = %e, "cannot read provider directory");
			return;
		}
	};

	for entry in entries.flatten() {
		let path = entry.path();
		if path.is_dir() {
			collect_definitions(&path, depth + 1, out);
		} else if path.is_file() && is_definition(&path) {
			out.push(path);
		}
	}
}

fn is_definition(path: &Path) -> bool {
	path.extension().and_then(|e| e.to_str()) == Some(DEFINITION_EXTENSION)
		&& path
			.file_stem()
			.and_then(|s| s.to_str())
			.is_some_and(|s| !s.starts_with('.'))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	fn setup() -> (tempfile::TempDir, PathBuf, PathBuf, SearchPaths) {
		let temp_dir = tempfile::tempdir().unwrap();
		let system = temp_dir.path().join("system");
		let user = temp_dir.path().join("user");
		fs::create_dir_all(&system).unwrap();
		let paths = SearchPaths::new(&user, &[system.clone()]).unwrap();
		(temp_dir, system, user, paths)
	}

	#[test]
	fn test_find_all_empty_dirs() {
		let (_temp_dir, _system, _user, paths) = setup();
		let mut discovery = Discovery::new(&paths);
		assert!(discovery.find_all().is_empty());
		assert!(discovery.ids().is_empty());
	}

	#[test]
	fn test_find_all_recurses_and_filters_extension() {
		let (_temp_dir, system, _user, paths) = setup();
		fs::create_dir_all(system.join("nested/deeper")).unwrap();
		fs::write(system.join("a.p"), "").unwrap();
		fs::write(system.join("nested/deeper/b.p"), "").unwrap();
		fs::write(system.join("notes.txt"), "").unwrap();
		fs::write(system.join("c.p.bak"), "").unwrap();

		let mut discovery = Discovery::new(&paths);
		let found = discovery.find_all().to_vec();

		assert_eq!(found.len(), 2);
		assert!(found.contains(&system.join("a.p")));
		assert!(found.contains(&system.join("nested/deeper/b.p")));
	}

	#[test]
	fn test_resolve_prefers_user_dir() {
		let (_temp_dir, system, user, paths) = setup();
		fs::write(system.join("x.p"), "").unwrap();
		fs::write(user.join("x.p"), "").unwrap();
		fs::write(system.join("y.p"), "").unwrap();

		let mut discovery = Discovery::new(&paths);
		discovery.find_all();

		let x: ProviderId = "x".parse().unwrap();
		let y: ProviderId = "y".parse().unwrap();
		assert_eq!(discovery.resolve(&x), Some(user.join("x.p").as_path()));
		assert_eq!(discovery.resolve(&y), Some(system.join("y.p").as_path()));
		assert_eq!(discovery.resolve(&"z".parse().unwrap()), None);
		assert_eq!(discovery.ids(), vec![x, y]);
	}

	#[test]
	fn test_resolve_matches_whole_stem() {
		let (_temp_dir, _system, user, paths) = setup();
		fs::write(user.join("xx.p"), "").unwrap();

		let mut discovery = Discovery::new(&paths);
		discovery.find_all();

		assert_eq!(discovery.resolve(&"x".parse().unwrap()), None);
	}

	#[test]
	fn test_find_all_twice_does_not_duplicate() {
		let (_temp_dir, _system, user, paths) = setup();
		fs::write(user.join("a.p"), "").unwrap();

		let mut discovery = Discovery::new(&paths);
		discovery.find_all();
		discovery.find_all();

		assert_eq!(discovery.paths().len(), 1);
	}

	#[test]
	fn test_record_and_forget() {
		let (_temp_dir, system, user, paths) = setup();
		fs::write(system.join("a.p"), "").unwrap();
		let mut discovery = Discovery::new(&paths);
		discovery.find_all();

		let id: ProviderId = "a".parse().unwrap();
		discovery.record(&user.join("a.p"));
		discovery.record(&user.join("a.p"));
		assert_eq!(discovery.paths().len(), 2);
		assert_eq!(discovery.resolve(&id), Some(user.join("a.p").as_path()));

		discovery.forget(&user.join("a.p"));
		assert_eq!(discovery.resolve(&id), Some(system.join("a.p").as_path()));
	}
}

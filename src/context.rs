use crate::catalog::{Catalog, Discovery};
use crate::config::SearchPaths;
use crate::error::{ProviderError, Result};
use crate::profile::BrowserProfile;
use crate::provider::parser::parse_definition_file;
use crate::provider::types::{Icon, ProviderId, ProviderRecord};
use crate::writer::{WriteOutcome, delete_definition, rename_definition, write_provider};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Successful result of parsing a provider by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
	/// The definition was parsed and stored in the catalog.
	Added(ProviderId),
	/// The catalog already held the id; nothing was read.
	AlreadyInList,
}

/// Owns the search paths, the discovery index and the catalog.
///
/// Build one at start-up and pass it to whatever needs providers.
#[derive(Debug)]
pub struct ProviderContext {
	paths: SearchPaths,
	discovery: Discovery,
	catalog: Catalog,
}

impl ProviderContext {
	pub fn new(paths: SearchPaths) -> Self {
		let discovery = Discovery::new(&paths);
		ProviderContext {
			paths,
			discovery,
			catalog: Catalog::new(),
		}
	}

	pub fn paths(&self) -> &SearchPaths {
		&self.paths
	}

	pub fn discovery(&self) -> &Discovery {
		&self.discovery
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn get(&self, id: &ProviderId) -> Option<&ProviderRecord> {
		self.catalog.get(id)
	}

	/// Walk all search directories and parse every provider found.
	///
	/// One entry per distinct id, with the path that wins the priority
	/// resolution. Failures are reported per entry and never stop the pass.
	/// The catalog is sorted by id afterwards.
	pub fn discover(&mut self) -> Vec<(PathBuf, Result<ParseOutcome>)> {
		self.discovery.find_all();

		let mut report = Vec::new();
		for id in self.discovery.ids() {
			let Some(path) = self.discovery.resolve(&id).map(|p| p.to_path_buf()) else {
				continue;
			};
			let outcome = self.parse(&id);
			match &outcome {
				Ok(ParseOutcome::Added(id)) => {
					info!(id = %id, path = %path.display(), "loaded provider")
				}
				Ok(ParseOutcome::AlreadyInList) => {
					debug!(id = %id, path = %path.display(), "provider already loaded")
				}
				Err(e) => warn!(
					id = %id,
					path = %path.display(),
					status = %e.status(),
					error = %e,
					"provider skipped"
				),
			}
			report.push((path, outcome));
		}

		self.catalog.sort();
		report
	}

	/// Parse the highest-priority definition for `id` into the catalog.
	pub fn parse(&mut self, id: &ProviderId) -> Result<ParseOutcome> {
		let path = self
			.discovery
			.resolve(id)
			.ok_or_else(|| ProviderError::NotFound { id: id.to_string() })?
			.to_path_buf();

		if self.catalog.contains(id) {
			return Ok(ParseOutcome::AlreadyInList);
		}

		let record = parse_definition_file(&path, self.paths.user_dir())?;
		self.catalog.insert(record);
		Ok(ParseOutcome::Added(id.clone()))
	}

	/// A fresh in-memory record with an unused random id, located in the
	/// user directory. Nothing is stored until it is saved.
	pub fn new_provider(&self, name: &str, url: &str) -> ProviderRecord {
		let id = loop {
			let id = ProviderId::random();
			if !self.catalog.contains(&id) && self.discovery.resolve(&id).is_none() {
				break id;
			}
		};
		let mut record = ProviderRecord::new(id, self.paths.user_dir());
		record.display_name = name.to_string();
		record.url = url.to_string();
		record
	}

	/// Persist a record that is not in the catalog yet.
	///
	/// Fails when a user definition already owns the id; a system one is overridden.
	pub fn create(&mut self, record: ProviderRecord) -> Result<WriteOutcome> {
		let taken = self
			.catalog
			.get(&record.id)
			.is_some_and(|p| !p.is_system_provided)
			|| self.paths.user_dir().join(record.id.file_name()).exists();
		if taken {
			return Err(ProviderError::IdConflict {
				id: record.id.to_string(),
			});
		}

		let id = record.id.clone();
		self.save(&id, record)
	}

	/// Persist `record`, which was loaded (or created) under `original`.
	///
	/// Writes always land in the user directory; saving a system provided
	/// record creates a user override. A changed id renames the user file
	/// first. The catalog is only updated once the write succeeded.
	pub fn save(&mut self, original: &ProviderId, record: ProviderRecord) -> Result<WriteOutcome> {
		let user_dir = self.paths.user_dir().to_path_buf();
		let dir = if record.source_dir.starts_with(&user_dir) {
			record.source_dir.clone()
		} else {
			user_dir
		};

		let problems = record.validation_problems();
		if !problems.is_empty() {
			return Err(ProviderError::InvalidDefinition {
				path: dir.join(record.id.file_name()),
				problems,
			});
		}

		let owns_original = self
			.catalog
			.get(original)
			.is_some_and(|p| !p.is_system_provided);
		let renamed = &record.id != original;

		if (renamed || !self.catalog.contains(original))
			&& let Some(holder) = self.catalog.get(&record.id)
		{
			if !holder.is_system_provided {
				return Err(ProviderError::IdConflict {
					id: record.id.to_string(),
				});
			}
			warn!(
				id = %record.id,
				path = %holder.definition_path().display(),
				"overriding system provided definition"
			);
		}

		if renamed && owns_original && rename_definition(&dir, original, &record.id)? {
			self.discovery.forget(&dir.join(original.file_name()));
		}

		let outcome = write_provider(&dir, &record)?;

		let mut stored = record;
		stored.icon = Icon::resolve(&stored.icon.raw, &dir);
		stored.source_dir = dir;
		stored.is_system_provided = false;
		self.discovery.record(&stored.definition_path());
		info!(id = %stored.id, path = %stored.definition_path().display(), ?outcome, "saved provider");

		let key = if owns_original {
			original.clone()
		} else {
			stored.id.clone()
		};
		if self.catalog.contains(&key) {
			self.catalog.replace(&key, stored);
		} else {
			self.catalog.insert(stored);
		}

		Ok(outcome)
	}

	/// Apply `mutation` to a copy of the record under `id` and save it.
	pub fn update<F>(&mut self, id: &ProviderId, mutation: F) -> Result<WriteOutcome>
	where
		F: FnOnce(&mut ProviderRecord),
	{
		let copy = self
			.catalog
			.edit(id, mutation)
			.ok_or_else(|| ProviderError::NotFound { id: id.to_string() })?;
		self.save(id, copy)
	}

	/// Give the provider under `id` a new id, renaming its file.
	pub fn rename(&mut self, id: &ProviderId, new_id: ProviderId) -> Result<WriteOutcome> {
		self.update(id, |record| record.id = new_id)
	}

	/// Delete a user provider from disk and from the catalog.
	///
	/// A system definition shadowed by the removed one is loaded back.
	pub fn remove(&mut self, id: &ProviderId) -> Result<ProviderRecord> {
		let record = self
			.catalog
			.get(id)
			.ok_or_else(|| ProviderError::NotFound { id: id.to_string() })?;
		if record.is_system_provided {
			return Err(ProviderError::SystemProvided { id: id.to_string() });
		}

		let path = record.definition_path();
		delete_definition(&path)?;
		self.discovery.forget(&path);

		let removed = self
			.catalog
			.remove(id)
			.ok_or_else(|| ProviderError::NotFound { id: id.to_string() })?;
		info!(id = %id, path = %path.display(), "removed provider");

		self.restore_shadowed(id);
		Ok(removed)
	}

	/// Browser profile for the provider under `id`.
	pub fn load_profile(&self, id: &ProviderId) -> Result<BrowserProfile> {
		let record = self
			.catalog
			.get(id)
			.ok_or_else(|| ProviderError::NotFound { id: id.to_string() })?;
		BrowserProfile::from_record(record)
	}

	fn restore_shadowed(&mut self, id: &ProviderId) {
		match self.parse(id) {
			Ok(ParseOutcome::Added(id)) => {
				info!(id = %id, "restored shadowed provider definition");
				self.catalog.sort();
			}
			Ok(ParseOutcome::AlreadyInList) | Err(ProviderError::NotFound { .. }) => {}
			Err(e) => warn!(id = %id, error = %e, "shadowed provider definition not restored"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::StatusCode;
	use crate::provider::types::{InjectionPoint, Script};
	use std::fs;
	use std::path::Path;

	struct Fixture {
		_temp_dir: tempfile::TempDir,
		system: PathBuf,
		user: PathBuf,
	}

	impl Fixture {
		fn new() -> Self {
			let temp_dir = tempfile::tempdir().unwrap();
			let system = temp_dir.path().join("system");
			let user = temp_dir.path().join("user");
			fs::create_dir_all(&system).unwrap();
			fs::create_dir_all(&user).unwrap();
			Fixture {
				_temp_dir: temp_dir,
				system,
				user,
			}
		}

		fn context(&self) -> ProviderContext {
			let paths = SearchPaths::new(&self.user, &[self.system.clone()]).unwrap();
			ProviderContext::new(paths)
		}
	}

	fn id(id: &str) -> ProviderId {
		id.parse().unwrap()
	}

	fn write(dir: &Path, name: &str, content: &str) {
		fs::write(dir.join(name), content).unwrap();
	}

	#[test]
	fn test_parse_unknown_id_is_not_found() {
		let fixture = Fixture::new();
		let mut context = fixture.context();
		context.discover();

		let err = context.parse(&id("missing")).unwrap_err();
		assert!(matches!(err, ProviderError::NotFound { .. }));
		assert_eq!(err.status(), StatusCode::FileError);
	}

	#[test]
	fn test_discover_reports_each_id_once() {
		let fixture = Fixture::new();
		write(&fixture.system, "b.p", "name:B\nurl:https://b\n");
		write(&fixture.system, "a.p", "name:A system\nurl:https://a\n");
		write(&fixture.user, "a.p", "name:A user\nurl:https://a\n");
		write(&fixture.user, "bad.p", "name:Bad\n");
		write(&fixture.user, "empty.p", "");

		let mut context = fixture.context();
		let report = context.discover();

		assert_eq!(report.len(), 4);
		let added = report
			.iter()
			.filter(|(_, outcome)| matches!(outcome, Ok(ParseOutcome::Added(_))))
			.count();
		assert_eq!(added, 2);

		let ids: Vec<_> = context.catalog().iter().map(|p| p.id.as_str()).collect();
		assert_eq!(ids, vec!["a", "b"]);
		assert_eq!(context.get(&id("a")).unwrap().display_name, "A user");

		let statuses: Vec<_> = report
			.iter()
			.filter_map(|(_, outcome)| outcome.as_ref().err().map(|e| e.status()))
			.collect();
		assert!(statuses.contains(&StatusCode::SyntaxError));
		assert!(statuses.contains(&StatusCode::FileEmpty));
	}

	#[test]
	fn test_new_provider_gets_unused_random_id() {
		let fixture = Fixture::new();
		let context = fixture.context();
		let record = context.new_provider("New", "https://new");

		assert_eq!(record.id.as_str().len(), 16);
		assert_eq!(record.source_dir, fixture.user);
		assert!(!record.is_system_provided);
		assert!(context.get(&record.id).is_none());
	}

	#[test]
	fn test_save_new_provider() {
		let fixture = Fixture::new();
		let mut context = fixture.context();
		let record = context.new_provider("New", "https://new");
		let new_id = record.id.clone();

		let outcome = context.create(record).unwrap();

		assert_eq!(outcome, WriteOutcome::Created);
		let path = fixture.user.join(new_id.file_name());
		assert_eq!(
			fs::read_to_string(&path).unwrap(),
			"name:New\nurl:https://new\n"
		);
		assert!(context.get(&new_id).is_some());
		assert_eq!(context.discovery().resolve(&new_id), Some(path.as_path()));
	}

	#[test]
	fn test_create_refuses_taken_user_id() {
		let fixture = Fixture::new();
		write(&fixture.user, "x.p", "name:X\nurl:https://x\n");
		let mut context = fixture.context();
		context.discover();

		let mut record = context.new_provider("Other", "https://other");
		record.id = id("x");
		let err = context.create(record).unwrap_err();

		assert!(matches!(err, ProviderError::IdConflict { .. }));
		assert_eq!(
			fs::read_to_string(fixture.user.join("x.p")).unwrap(),
			"name:X\nurl:https://x\n"
		);
	}

	#[test]
	fn test_create_overrides_system_id() {
		let fixture = Fixture::new();
		write(&fixture.system, "x.p", "name:System\nurl:https://x\n");
		let mut context = fixture.context();
		context.discover();

		let mut record = context.new_provider("Mine", "https://mine");
		record.id = id("x");
		assert_eq!(context.create(record).unwrap(), WriteOutcome::Created);

		assert_eq!(context.catalog().len(), 1);
		assert_eq!(context.get(&id("x")).unwrap().display_name, "Mine");
	}

	#[test]
	fn test_save_rejects_invalid_record() {
		let fixture = Fixture::new();
		let mut context = fixture.context();
		let record = context.new_provider("", "");
		let new_id = record.id.clone();

		let err = context.save(&new_id, record).unwrap_err();

		assert_eq!(err.status(), StatusCode::SyntaxError);
		assert!(context.catalog().is_empty());
		assert!(!fixture.user.join(new_id.file_name()).exists());
	}

	#[test]
	fn test_update_patches_and_commits() {
		let fixture = Fixture::new();
		write(
			&fixture.user,
			"x.p",
			"# mine\nname:Example\nurl:https://example.com\ntitlebar:true\ntitlebar-color:#ff0000\n",
		);
		let mut context = fixture.context();
		context.discover();

		let outcome = context
			.update(&id("x"), |p| p.display_name = "Example 2".to_string())
			.unwrap();

		assert_eq!(outcome, WriteOutcome::Patched);
		assert_eq!(
			fs::read_to_string(fixture.user.join("x.p")).unwrap(),
			"# mine\nname:Example 2\nurl:https://example.com\ntitlebar:true\ntitlebar-color:#ff0000\n"
		);
		assert_eq!(context.get(&id("x")).unwrap().display_name, "Example 2");
	}

	#[test]
	fn test_noop_update_keeps_skipped_lines() {
		let fixture = Fixture::new();
		let content = "name:A\nscript:foo.js\nscript:foo.js,defer\n# tail\nurl:https://a\nurlInterceptorTarget:https://orphan\n";
		write(&fixture.user, "x.p", content);
		let mut context = fixture.context();
		context.discover();

		context.update(&id("x"), |_| {}).unwrap();

		assert_eq!(fs::read_to_string(fixture.user.join("x.p")).unwrap(), content);
	}

	#[test]
	fn test_update_rejects_line_break_in_value() {
		let fixture = Fixture::new();
		let content = "name:A\nurl:https://a\n";
		write(&fixture.user, "x.p", content);
		let mut context = fixture.context();
		context.discover();

		let err = context
			.update(&id("x"), |p| p.display_name = "B\nurl:https://evil".to_string())
			.unwrap_err();

		assert!(matches!(err, ProviderError::InvalidDefinition { .. }));
		assert_eq!(fs::read_to_string(fixture.user.join("x.p")).unwrap(), content);
		assert_eq!(context.get(&id("x")).unwrap().display_name, "A");
	}

	#[test]
	fn test_update_rejects_duplicate_script() {
		let fixture = Fixture::new();
		write(&fixture.user, "x.p", "name:A\nurl:https://a\nscript:foo.js\n");
		let mut context = fixture.context();
		context.discover();

		let err = context
			.update(&id("x"), |p| {
				p.scripts.push(Script::new("foo.js", InjectionPoint::Deferred))
			})
			.unwrap_err();

		assert_eq!(err.status(), StatusCode::SyntaxError);
		assert_eq!(context.get(&id("x")).unwrap().scripts.len(), 1);
	}

	#[test]
	fn test_failed_write_leaves_catalog_untouched() {
		let fixture = Fixture::new();
		let path = fixture.user.join("x.p");
		write(&fixture.user, "x.p", "name:Example\nurl:https://example.com\n");
		let mut context = fixture.context();
		context.discover();

		let mut permissions = fs::metadata(&path).unwrap().permissions();
		permissions.set_readonly(true);
		fs::set_permissions(&path, permissions).unwrap();

		let err = context
			.update(&id("x"), |p| p.display_name = "Changed".to_string())
			.unwrap_err();

		assert_eq!(err.status(), StatusCode::PermError);
		assert_eq!(context.get(&id("x")).unwrap().display_name, "Example");
	}

	#[test]
	fn test_saving_system_provider_creates_override() {
		let fixture = Fixture::new();
		write(&fixture.system, "x.p", "name:System\nurl:https://x\n");
		let mut context = fixture.context();
		context.discover();
		assert!(context.get(&id("x")).unwrap().is_system_provided);

		let outcome = context
			.update(&id("x"), |p| p.display_name = "Mine".to_string())
			.unwrap();

		assert_eq!(outcome, WriteOutcome::Created);
		assert_eq!(
			fs::read_to_string(fixture.system.join("x.p")).unwrap(),
			"name:System\nurl:https://x\n"
		);
		let stored = context.get(&id("x")).unwrap();
		assert!(!stored.is_system_provided);
		assert_eq!(stored.source_dir, fixture.user);
		assert_eq!(context.catalog().len(), 1);
		assert_eq!(
			context.discovery().resolve(&id("x")),
			Some(fixture.user.join("x.p").as_path())
		);
	}

	#[test]
	fn test_rename_moves_file_and_catalog_entry() {
		let fixture = Fixture::new();
		write(&fixture.user, "old.p", "# note\nname:A\nurl:https://a\n");
		let mut context = fixture.context();
		context.discover();

		context.rename(&id("old"), id("new")).unwrap();

		assert!(!fixture.user.join("old.p").exists());
		assert_eq!(
			fs::read_to_string(fixture.user.join("new.p")).unwrap(),
			"# note\nname:A\nurl:https://a\n"
		);
		assert!(context.get(&id("old")).is_none());
		assert!(context.get(&id("new")).is_some());
		assert!(context.discovery().resolve(&id("old")).is_none());
	}

	#[test]
	fn test_rename_to_taken_user_id_is_rejected() {
		let fixture = Fixture::new();
		write(&fixture.user, "a.p", "name:A\nurl:https://a\n");
		write(&fixture.user, "b.p", "name:B\nurl:https://b\n");
		let mut context = fixture.context();
		context.discover();

		let err = context.rename(&id("a"), id("b")).unwrap_err();

		assert!(matches!(err, ProviderError::IdConflict { .. }));
		assert!(fixture.user.join("a.p").exists());
		assert_eq!(context.get(&id("b")).unwrap().display_name, "B");
	}

	#[test]
	fn test_rename_over_system_id_overrides_it() {
		let fixture = Fixture::new();
		write(&fixture.system, "b.p", "name:System B\nurl:https://b\n");
		write(&fixture.user, "a.p", "name:A\nurl:https://a\n");
		let mut context = fixture.context();
		context.discover();

		context.rename(&id("a"), id("b")).unwrap();

		assert_eq!(context.catalog().len(), 1);
		let stored = context.get(&id("b")).unwrap();
		assert_eq!(stored.display_name, "A");
		assert!(!stored.is_system_provided);
	}

	#[test]
	fn test_remove_system_provider_is_rejected() {
		let fixture = Fixture::new();
		write(&fixture.system, "x.p", "name:X\nurl:https://x\n");
		let mut context = fixture.context();
		context.discover();

		let err = context.remove(&id("x")).unwrap_err();

		assert!(matches!(err, ProviderError::SystemProvided { .. }));
		assert!(fixture.system.join("x.p").exists());
		assert!(context.get(&id("x")).is_some());
	}

	#[test]
	fn test_remove_restores_shadowed_definition() {
		let fixture = Fixture::new();
		write(&fixture.system, "x.p", "name:System\nurl:https://x\n");
		write(&fixture.user, "x.p", "name:User\nurl:https://x\n");
		let mut context = fixture.context();
		context.discover();

		let removed = context.remove(&id("x")).unwrap();

		assert_eq!(removed.display_name, "User");
		assert!(!fixture.user.join("x.p").exists());
		let restored = context.get(&id("x")).unwrap();
		assert_eq!(restored.display_name, "System");
		assert!(restored.is_system_provided);
	}

	#[test]
	fn test_remove_unknown_is_not_found() {
		let fixture = Fixture::new();
		let mut context = fixture.context();
		assert!(matches!(
			context.remove(&id("x")),
			Err(ProviderError::NotFound { .. })
		));
	}

	#[test]
	fn test_load_profile() {
		let fixture = Fixture::new();
		write(
			&fixture.user,
			"x.p",
			"name:X\nurl:https://x\nurlInterceptorPattern:https://ads/.*\nurlInterceptorTarget:about:blank\n",
		);
		let mut context = fixture.context();
		context.discover();

		let profile = context.load_profile(&id("x")).unwrap();
		assert_eq!(profile.profile_id, "x");
		assert_eq!(profile.interceptor.intercept("https://ads/1"), Some("about:blank"));
		assert!(context.load_profile(&id("y")).is_err());
	}
}

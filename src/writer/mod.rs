//! Writing provider definitions back to disk.
//!
//! This module handles:
//! - Rendering a fresh definition in canonical field order
//! - Patching an existing definition in place without losing comments or unknown lines
//! - Renaming and deleting definition files

mod layout;
mod patch;

use crate::error::{ProviderError, Result};
use crate::provider::types::{ProviderId, ProviderRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

pub use layout::render_definition;

/// How a definition reached the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
	/// No file existed; a canonical one was written.
	Created,
	/// An existing file was patched (possibly without any change).
	Patched,
}

/// Write `record` to `<dir>/<id>.p`.
///
/// An existing file is patched in place; a read-only one yields
/// [`ProviderError::PermissionDenied`] before anything is touched.
pub fn write_provider(dir: &Path, record: &ProviderRecord) -> Result<WriteOutcome> {
	let path = dir.join(record.id.file_name());

	if !path.exists() {
		fs::create_dir_all(dir).map_err(|source| ProviderError::CreateDirError {
			path: dir.to_path_buf(),
			source,
		})?;
		fs::write(&path, render_definition(record))
			.map_err(|e| ProviderError::from_write(path.clone(), e))?;
		debug!(id = %record.id, path = %path.display(), "created provider definition");
		return Ok(WriteOutcome::Created);
	}

	let readonly = fs::metadata(&path)
		.map(|m| m.permissions().readonly())
		.map_err(|source| ProviderError::ReadError {
			path: path.clone(),
			source,
		})?;
	if readonly {
		return Err(ProviderError::PermissionDenied { path });
	}

	let content = fs::read_to_string(&path).map_err(|source| ProviderError::ReadError {
		path: path.clone(),
		source,
	})?;
	let patched = patch::patch_definition(&content, record);

	if patched == content {
		debug!(id = %record.id, path = %path.display(), "provider definition unchanged");
	} else {
		fs::write(&path, patched).map_err(|e| ProviderError::from_write(path.clone(), e))?;
		debug!(id = %record.id, path = %path.display(), "patched provider definition");
	}

	Ok(WriteOutcome::Patched)
}

/// Move `<dir>/<old>.p` to `<dir>/<new>.p`.
///
/// Returns false when there was no file to move. An existing target is
/// never overwritten.
pub fn rename_definition(dir: &Path, old: &ProviderId, new: &ProviderId) -> Result<bool> {
	let from = dir.join(old.file_name());
	let to = dir.join(new.file_name());

	if to.exists() {
		return Err(ProviderError::IdConflict {
			id: new.to_string(),
		});
	}
	if !from.exists() {
		return Ok(false);
	}

	fs::rename(&from, &to).map_err(|e| ProviderError::from_write(to.clone(), e))?;
	debug!(from = %from.display(), to = %to.display(), "renamed provider definition");
	Ok(true)
}

/// Delete a definition file. A file that is already gone is not an error.
pub fn delete_definition(path: &Path) -> Result<()> {
	match fs::remove_file(path) {
		Ok(()) => {
			debug!(path = %path.display(), "deleted provider definition");
			Ok(())
		}
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
		Err(e) => Err(ProviderError::from_write(PathBuf::from(path), e)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::StatusCode;
	use crate::provider::parser::parse_definition_file;

	fn record(dir: &Path, id: &str) -> ProviderRecord {
		let mut record = ProviderRecord::new(id.parse().unwrap(), dir);
		record.display_name = "Example".to_string();
		record.url = "https://example.com".to_string();
		record
	}

	#[test]
	fn test_write_creates_canonical_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let dir = temp_dir.path().join("providers");
		let record = record(&dir, "example");

		let outcome = write_provider(&dir, &record).unwrap();

		assert_eq!(outcome, WriteOutcome::Created);
		let content = fs::read_to_string(dir.join("example.p")).unwrap();
		assert_eq!(content, "name:Example\nurl:https://example.com\n");
	}

	#[test]
	fn test_write_patches_existing_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let dir = temp_dir.path();
		let path = dir.join("example.p");
		fs::write(&path, "# keep\nname:Example\nurl:https://example.com\n").unwrap();

		let mut record = parse_definition_file(&path, dir).unwrap();
		record.display_name = "Example 2".to_string();
		let outcome = write_provider(dir, &record).unwrap();

		assert_eq!(outcome, WriteOutcome::Patched);
		assert_eq!(
			fs::read_to_string(&path).unwrap(),
			"# keep\nname:Example 2\nurl:https://example.com\n"
		);
	}

	#[test]
	fn test_write_readonly_file_is_permission_error() {
		let temp_dir = tempfile::tempdir().unwrap();
		let dir = temp_dir.path();
		let path = dir.join("example.p");
		fs::write(&path, "name:Example\nurl:https://example.com\n").unwrap();
		let mut permissions = fs::metadata(&path).unwrap().permissions();
		permissions.set_readonly(true);
		fs::set_permissions(&path, permissions).unwrap();

		let mut record = record(dir, "example");
		record.display_name = "Changed".to_string();
		let err = write_provider(dir, &record).unwrap_err();

		assert_eq!(err.status(), StatusCode::PermError);
		assert_eq!(
			fs::read_to_string(&path).unwrap(),
			"name:Example\nurl:https://example.com\n"
		);
	}

	#[test]
	fn test_rename_moves_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let dir = temp_dir.path();
		fs::write(dir.join("old.p"), "name:A\nurl:https://a\n").unwrap();

		let moved = rename_definition(dir, &"old".parse().unwrap(), &"new".parse().unwrap()).unwrap();

		assert!(moved);
		assert!(!dir.join("old.p").exists());
		assert!(dir.join("new.p").exists());
	}

	#[test]
	fn test_rename_refuses_existing_target() {
		let temp_dir = tempfile::tempdir().unwrap();
		let dir = temp_dir.path();
		fs::write(dir.join("old.p"), "name:A\nurl:https://a\n").unwrap();
		fs::write(dir.join("new.p"), "name:B\nurl:https://b\n").unwrap();

		let err = rename_definition(dir, &"old".parse().unwrap(), &"new".parse().unwrap()).unwrap_err();

		assert!(matches!(err, ProviderError::IdConflict { ref id } if id == "new"));
		assert!(dir.join("old.p").exists());
	}

	#[test]
	fn test_rename_without_source_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let moved =
			rename_definition(temp_dir.path(), &"old".parse().unwrap(), &"new".parse().unwrap())
				.unwrap();
		assert!(!moved);
	}

	#[test]
	fn test_delete_missing_file_is_ok() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("gone.p");
		assert!(delete_definition(&path).is_ok());

		fs::write(&path, "name:A\n").unwrap();
		delete_definition(&path).unwrap();
		assert!(!path.exists());
	}
}

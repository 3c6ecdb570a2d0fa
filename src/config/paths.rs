use crate::error::{ProviderError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory name used below the platform locations.
pub const APP_NAME: &str = "stream-viewer";

/// Name of the provider directory inside each location.
pub const PROVIDER_DIR_NAME: &str = "providers";

/// Ordered provider search directories.
///
/// The search order is:
/// 1. System share locations (lowest priority)
/// 2. The directory next to the executable
/// 3. The per-user configuration directory (highest priority, the only writable one)
#[derive(Debug, Clone)]
pub struct SearchPaths {
	system: Vec<PathBuf>,
	user: PathBuf,
}

impl SearchPaths {
	/// Build search paths from an explicit user directory and system candidates.
	///
	/// The user directory is created if missing. System candidates that do not
	/// exist or cannot be read are dropped silently.
	pub fn new(user_dir: impl Into<PathBuf>, system_candidates: &[PathBuf]) -> Result<Self> {
		let user = user_dir.into();
		std::fs::create_dir_all(&user).map_err(|source| ProviderError::CreateDirError {
			path: user.clone(),
			source,
		})?;

		let mut system = Vec::new();
		for candidate in system_candidates {
			if candidate == &user || system.contains(candidate) {
				continue;
			}
			if is_readable_dir(candidate) {
				system.push(candidate.clone());
			} else {
				debug!(path = %candidate.display(), "skipping unavailable provider directory");
			}
		}

		Ok(SearchPaths { system, user })
	}

	/// Build the platform default search paths.
	pub fn platform() -> Result<Self> {
		Self::new(user_provider_dir()?, &system_provider_candidates())
	}

	/// All search directories, lowest priority first, user directory last.
	pub fn search_dirs(&self) -> Vec<&Path> {
		self.system
			.iter()
			.map(PathBuf::as_path)
			.chain(std::iter::once(self.user.as_path()))
			.collect()
	}

	/// Read-only directories, lowest priority first.
	pub fn system_dirs(&self) -> &[PathBuf] {
		&self.system
	}

	/// The only directory definitions are written to.
	pub fn user_dir(&self) -> &Path {
		&self.user
	}
}

/// Get the path to the application's configuration root.
pub fn app_config_dir() -> Result<PathBuf> {
	let config_dir = dirs::config_dir().ok_or(ProviderError::ConfigDirectoryNotFound)?;
	Ok(config_dir.join(APP_NAME))
}

/// Get the path to the user's provider directory.
pub fn user_provider_dir() -> Result<PathBuf> {
	Ok(app_config_dir()?.join(PROVIDER_DIR_NAME))
}

/// Read-only provider locations for this platform, lowest priority first.
pub fn system_provider_candidates() -> Vec<PathBuf> {
	let mut candidates: Vec<PathBuf> = platform_share_dirs()
		.into_iter()
		.map(|dir| dir.join(APP_NAME).join(PROVIDER_DIR_NAME))
		.collect();

	if let Ok(exe) = std::env::current_exe()
		&& let Some(exe_dir) = exe.parent()
	{
		candidates.push(exe_dir.join(PROVIDER_DIR_NAME));
	}

	candidates
}

#[cfg(target_os = "macos")]
fn platform_share_dirs() -> Vec<PathBuf> {
	vec![PathBuf::from("/Library/Application Support")]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_share_dirs() -> Vec<PathBuf> {
	vec![
		PathBuf::from("/usr/share"),
		PathBuf::from("/usr/local/share"),
	]
}

#[cfg(not(unix))]
fn platform_share_dirs() -> Vec<PathBuf> {
	Vec::new()
}

fn is_readable_dir(path: &Path) -> bool {
	path.is_dir() && std::fs::read_dir(path).is_ok()
}

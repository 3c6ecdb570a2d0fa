use crate::error::{ProviderError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the settings file inside the application config root.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Application settings from `settings.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
	/// Provider to open directly instead of showing the selection.
	#[serde(default)]
	pub startup_provider: Option<String>,

	/// Open browser windows full screen.
	#[serde(default)]
	pub fullscreen: bool,

	/// Default `tracing` filter directive, e.g. `"info"` or `"provider_store=debug"`.
	#[serde(default)]
	pub log_level: Option<String>,
}

/// Path of the settings file inside `config_root`.
pub fn settings_path(config_root: &Path) -> PathBuf {
	config_root.join(SETTINGS_FILE_NAME)
}

/// Load settings from `path`, using defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<Settings> {
	if path.exists() {
		tracing::debug!("Loading settings from {}", path.display());
		parse_settings_file(path)
	} else {
		tracing::debug!("Settings file not found, using defaults");
		Ok(Settings::default())
	}
}

/// Parse a settings file from the given path.
pub fn parse_settings_file(path: &Path) -> Result<Settings> {
	let content =
		std::fs::read_to_string(path).map_err(|source| ProviderError::SettingsReadError {
			path: path.to_path_buf(),
			source,
		})?;

	parse_settings_str(&content, path)
}

/// Parse settings from a string (useful for testing).
pub fn parse_settings_str(content: &str, path: &Path) -> Result<Settings> {
	toml::from_str(content).map_err(|source| ProviderError::SettingsParseError {
		path: path.to_path_buf(),
		source,
	})
}

use std::fmt;
use std::path::PathBuf;

/// Library-level structured errors for provider handling.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("No provider definition found for id: {id}")]
	NotFound { id: String },

	#[error("Failed to read provider definition: {path}")]
	ReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Provider definition is empty: {path}")]
	EmptyFile { path: PathBuf },

	#[error("Invalid provider definition: {path} ({})", .problems.join("; "))]
	InvalidDefinition { path: PathBuf, problems: Vec<String> },

	#[error("Provider definition is not writable: {path}")]
	PermissionDenied { path: PathBuf },

	#[error("Failed to write provider definition: {path}")]
	WriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Provider id is already taken: {id}")]
	IdConflict { id: String },

	#[error("Provider id is not a valid file name: {id:?}")]
	InvalidId { id: String },

	#[error("Provider is system provided and cannot be removed: {id}")]
	SystemProvided { id: String },

	#[error("Invalid interceptor pattern: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Failed to create provider directory: {path}")]
	CreateDirError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to read settings file: {path}")]
	SettingsReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse settings file: {path}")]
	SettingsParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to resolve configuration directory")]
	ConfigDirectoryNotFound,
}

/// Status taxonomy reported for failed parse and write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
	/// Definition missing, unreadable or unwritable at the filesystem level.
	FileError,
	/// Definition exists but has no content.
	FileEmpty,
	/// Definition failed semantic validation.
	SyntaxError,
	/// Definition exists but is not writable.
	PermError,
	/// The requested edit was refused before touching the disk.
	Rejected,
}

impl StatusCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			StatusCode::FileError => "FILE_ERROR",
			StatusCode::FileEmpty => "FILE_EMPTY",
			StatusCode::SyntaxError => "SYNTAX_ERROR",
			StatusCode::PermError => "PERM_ERROR",
			StatusCode::Rejected => "REJECTED",
		}
	}
}

impl fmt::Display for StatusCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl ProviderError {
	/// Classify this error into the status taxonomy.
	pub fn status(&self) -> StatusCode {
		match self {
			ProviderError::NotFound { .. }
			| ProviderError::ReadError { .. }
			| ProviderError::WriteError { .. }
			| ProviderError::CreateDirError { .. }
			| ProviderError::SettingsReadError { .. }
			| ProviderError::ConfigDirectoryNotFound => StatusCode::FileError,
			ProviderError::EmptyFile { .. } => StatusCode::FileEmpty,
			ProviderError::InvalidDefinition { .. }
			| ProviderError::InvalidRegex { .. }
			| ProviderError::SettingsParseError { .. } => StatusCode::SyntaxError,
			ProviderError::PermissionDenied { .. } => StatusCode::PermError,
			ProviderError::IdConflict { .. }
			| ProviderError::InvalidId { .. }
			| ProviderError::SystemProvided { .. } => StatusCode::Rejected,
		}
	}

	/// Map an I/O error raised while writing `path`.
	pub(crate) fn from_write(path: PathBuf, source: std::io::Error) -> Self {
		if source.kind() == std::io::ErrorKind::PermissionDenied {
			ProviderError::PermissionDenied { path }
		} else {
			ProviderError::WriteError { path, source }
		}
	}
}

/// Result type alias using ProviderError.
pub type Result<T> = std::result::Result<T, ProviderError>;

//! Configuration for the provider subsystem.
//!
//! This module handles:
//! - Provider search path resolution
//! - Application settings parsing

pub mod paths;
pub mod settings;

pub use paths::{
	APP_NAME, PROVIDER_DIR_NAME, SearchPaths, app_config_dir, system_provider_candidates,
	user_provider_dir,
};
pub use settings::{Settings, load_settings, parse_settings_str, settings_path};

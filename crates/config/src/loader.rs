//! Configuration loading utilities

use crate::settings::{ConfigValidationError, Settings};
use config::{Config, ConfigError, Environment, File};
use thiserror::Error;
use tracing::debug;

/// Prefix for environment overrides, e.g. `XSWAP__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "XSWAP";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
	#[error("Failed to read configuration: {0}")]
	Source(#[from] ConfigError),

	#[error("Invalid configuration: {0}")]
	Validation(#[from] ConfigValidationError),
}

/// Load configuration from `config/config.*` (optional) and `XSWAP__*`
/// environment variables, then validate it
pub fn load_config() -> Result<Settings, ConfigLoadError> {
	if let Ok(path) = dotenvy::dotenv() {
		debug!("Loaded environment from {}", path.display());
	}
	load_config_from("config/config")
}

/// Load configuration from an explicit file stem
pub fn load_config_from(path: &str) -> Result<Settings, ConfigLoadError> {
	let s = Config::builder()
		.add_source(File::with_name(path).required(false))
		.add_source(
			Environment::with_prefix(ENV_PREFIX)
				.prefix_separator("__")
				.separator("__")
				.try_parsing(true),
		)
		.build()?;

	let settings: Settings = s.try_deserialize()?;
	settings.validate()?;
	Ok(settings)
}

//! Application configuration

use super::{default_data_dir, DatabaseConfig};
use crate::config::migration::Migrate;

use fr_ai::EmbedderKind;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{
	fs,
	path::{Path, PathBuf},
};
use tracing::{info, warn};

const CONFIG_FILE_NAME: &str = "face-registry.json";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
	/// Config schema version
	pub version: u32,

	/// Data directory path
	pub data_dir: PathBuf,

	/// Logging level, overridden by `RUST_LOG` when set
	pub log_level: String,

	/// HTTP port the server listens on
	pub port: u16,

	/// Directory holding `index.html` and the registration page assets
	#[serde(default)]
	pub static_dir: Option<PathBuf>,

	/// Relational store settings
	#[serde(default)]
	pub database: DatabaseConfig,

	/// Which embedder turns photos into vectors
	#[serde(default)]
	pub embedder: EmbedderKind,
}

impl AppConfig {
	/// Load configuration from the default location
	pub fn load() -> Result<Self> {
		let data_dir = default_data_dir()?;
		Self::load_from(&data_dir)
	}

	/// Load configuration from a specific data directory, creating it when missing
	pub fn load_from(data_dir: &Path) -> Result<Self> {
		let config_path = data_dir.join(CONFIG_FILE_NAME);

		if config_path.exists() {
			info!("Loading config from {:?}", config_path);
			let json = fs::read_to_string(&config_path)?;
			let mut config: Self = serde_json::from_str(&json)?;

			// Apply migrations if needed
			if config.needs_migration() {
				info!(
					"Migrating config from v{} to v{}",
					config.version,
					Self::target_version()
				);
				config.migrate()?;
				config.save()?;
			}

			Ok(config)
		} else {
			warn!("No config found, creating default at {:?}", config_path);
			let config = Self::default_with_dir(data_dir.to_path_buf());
			config.save()?;
			Ok(config)
		}
	}

	/// Create default configuration with specific data directory
	pub fn default_with_dir(data_dir: PathBuf) -> Self {
		Self {
			version: Self::target_version(),
			data_dir,
			log_level: "info".to_string(),
			port: 8000,
			static_dir: None,
			database: DatabaseConfig::default(),
			embedder: EmbedderKind::default(),
		}
	}

	/// Save configuration to disk
	pub fn save(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;

		let config_path = self.data_dir.join(CONFIG_FILE_NAME);
		let json = serde_json::to_string_pretty(self)?;
		fs::write(&config_path, json)?;
		info!("Saved config to {:?}", config_path);
		Ok(())
	}

	/// Get the path for logs directory
	pub fn logs_dir(&self) -> PathBuf {
		self.data_dir.join("logs")
	}

	/// Ensure all required directories exist
	pub fn ensure_directories(&self) -> Result<()> {
		fs::create_dir_all(&self.data_dir)?;
		fs::create_dir_all(self.logs_dir())?;
		Ok(())
	}
}

impl Default for AppConfig {
	fn default() -> Self {
		let data_dir = default_data_dir().unwrap_or_else(|_| PathBuf::from("."));
		Self::default_with_dir(data_dir)
	}
}

impl Migrate for AppConfig {
	fn current_version(&self) -> u32 {
		self.version
	}

	fn target_version() -> u32 {
		1 // Current schema version
	}

	fn migrate(&mut self) -> Result<()> {
		match self.version {
			0 => {
				// v0 predates the embedder setting; serde defaults already filled it in
				self.version = 1;
				Ok(())
			}
			1 => Ok(()), // Already at target version
			v => Err(anyhow!("Unknown config version: {}", v)),
		}
	}
}

//! Application configuration management

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub mod app_config;
pub mod migration;

pub use app_config::AppConfig;
pub use migration::Migrate;

/// Connection string used when nothing else is configured
pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/face_registration";

/// Platform-specific data directory resolution
pub fn default_data_dir() -> Result<PathBuf> {
	let dir = dirs::data_local_dir()
		.ok_or_else(|| anyhow!("Could not determine data directory"))?
		.join("face-registry");

	// Create directory if it doesn't exist
	fs::create_dir_all(&dir)?;

	Ok(dir)
}

/// Relational store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
	/// PostgreSQL connection string; `None` keeps identities in memory only
	pub url: Option<String>,

	/// Upper bound on pooled connections
	pub max_connections: u32,

	/// How long a request waits for a pooled connection before failing
	pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
	pub const fn acquire_timeout(&self) -> Duration {
		Duration::from_secs(self.acquire_timeout_secs)
	}
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			url: Some(DEFAULT_DATABASE_URL.to_string()),
			max_connections: 10,
			acquire_timeout_secs: 5,
		}
	}
}

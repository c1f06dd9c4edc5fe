//! Face Registry core
//!
//! Wires the embedder, assembler and identity store together at startup and hands
//! them to the [`RegistrationService`]. Nothing here lives in a global.

pub mod config;
pub mod identity;
pub mod logging;
pub mod registration;
pub mod store;

pub use config::AppConfig;
pub use identity::{Identity, IdentityRecord, NewIdentity, ValidationError};
pub use registration::{RegisteredSummary, RegistrationError, RegistrationService};
pub use store::{IdentityStore, MemoryIdentityStore, PgIdentityStore, StoreError};

use fr_ai::Assembler;

use std::sync::Arc;

use tracing::{info, warn};

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
	#[error("failed to prepare the identity store: {0}")]
	Store(#[from] StoreError),
	#[error("failed to prepare directories: {0}")]
	Directories(#[source] anyhow::Error),
}

/// The main context for all registry operations
pub struct Core {
	/// Application configuration
	pub config: AppConfig,

	/// Registration, listing and deletion of identities
	pub registrations: Arc<RegistrationService>,
}

impl Core {
	/// Builds every dependency from `config` and prepares the store schema.
	pub async fn new(config: AppConfig) -> Result<Self, CoreError> {
		info!("Initializing Face Registry at {:?}", config.data_dir);
		config.ensure_directories().map_err(CoreError::Directories)?;

		let assembler = Assembler::new(config.embedder.build());
		let width = assembler.concatenated_dimensions();

		let store: Arc<dyn IdentityStore> = if let Some(url) = &config.database.url {
			Arc::new(PgIdentityStore::connect(&config.database, url, width).await?)
		} else {
			warn!("No database configured, identities will only be kept in memory");
			Arc::new(MemoryIdentityStore::new(width))
		};

		Self::with_store(config, store, assembler).await
	}

	/// Uses an already built store, initialising its schema.
	pub async fn with_store(
		config: AppConfig,
		store: Arc<dyn IdentityStore>,
		assembler: Assembler,
	) -> Result<Self, CoreError> {
		store.init().await?;

		let registrations = Arc::new(RegistrationService::new(store, assembler)?);
		info!(
			embedding_dimensions = registrations.embedding_dimensions(),
			"Face Registry ready"
		);

		Ok(Self {
			config,
			registrations,
		})
	}
}

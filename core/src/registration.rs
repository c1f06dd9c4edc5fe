use crate::{
	identity::{Identity, IdentityRecord, NewIdentity, ValidationError},
	store::{IdentityStore, StoreError},
};

use fr_ai::{Angle, AngleMap, Assembler};

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

#[derive(thiserror::Error, Debug)]
pub enum RegistrationError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error("User ID already exists: <user_id='{0}'>")]
	DuplicateKey(String),
	#[error("Failed to generate face embeddings from {supplied} supplied photo(s)")]
	EmbeddingFailure { supplied: usize },
	#[error("User not found: <user_id='{0}'>")]
	NotFound(String),
	#[error(transparent)]
	Store(StoreError),
}

impl From<StoreError> for RegistrationError {
	fn from(e: StoreError) -> Self {
		match e {
			// A key taken between our `exists` check and the insert is the same client error
			StoreError::DuplicateKey(user_id) => Self::DuplicateKey(user_id),
			StoreError::NotFound(user_id) => Self::NotFound(user_id),
			e => Self::Store(e),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredSummary {
	pub user_id: String,
	/// Distinct angles that came with a non-empty photo
	pub photos_processed: usize,
	pub embedding_dimensions: usize,
}

/// The only place that talks to both the [`Assembler`] and the [`IdentityStore`].
pub struct RegistrationService {
	store: Arc<dyn IdentityStore>,
	assembler: Assembler,
}

impl RegistrationService {
	/// Fails when the store can't hold the vectors this assembler produces.
	pub fn new(store: Arc<dyn IdentityStore>, assembler: Assembler) -> Result<Self, StoreError> {
		let (expected, got) = (store.vector_width(), assembler.concatenated_dimensions());
		if expected != got {
			return Err(StoreError::DimensionMismatch { expected, got });
		}

		Ok(Self { store, assembler })
	}

	#[must_use]
	pub fn embedding_dimensions(&self) -> usize {
		self.assembler.concatenated_dimensions()
	}

	#[instrument(skip_all, fields(user_id = %identity.user_id), err)]
	pub async fn register(
		&self,
		identity: NewIdentity,
		photos: AngleMap,
	) -> Result<RegisteredSummary, RegistrationError> {
		let identity = identity.normalized();
		identity.validate()?;

		if self.store.exists(&identity.user_id).await? {
			return Err(RegistrationError::DuplicateKey(identity.user_id));
		}

		let supplied = photos.supplied_count();
		let assembly = self.assembler.assemble_concurrently(photos).await;

		for angle in Angle::CANONICAL_ORDER {
			debug!(%angle, status = ?assembly.status(angle), "Assembled slot");
		}

		if assembly.embedding.is_all_zero() {
			warn!(supplied, "No usable face signal in any photo, refusing to register");
			return Err(RegistrationError::EmbeddingFailure { supplied });
		}

		let embedding_dimensions = assembly.embedding.len();
		let embedded = assembly.embedded_count();
		let user_id = identity.user_id.clone();

		self.store
			.insert(IdentityRecord {
				identity: identity.registered_at(Utc::now()),
				embedding: assembly.embedding,
			})
			.await?;

		info!(supplied, embedded, "Registered identity");

		Ok(RegisteredSummary {
			user_id,
			photos_processed: supplied,
			embedding_dimensions,
		})
	}

	pub async fn list_identities(&self) -> Result<Vec<Identity>, RegistrationError> {
		Ok(self.store.list_all().await?)
	}

	pub async fn identity_record(
		&self,
		user_id: &str,
	) -> Result<Option<IdentityRecord>, RegistrationError> {
		Ok(self.store.get(user_id).await?)
	}

	#[instrument(skip(self), err)]
	pub async fn delete_identity(&self, user_id: &str) -> Result<(), RegistrationError> {
		self.store.delete_by_key(user_id).await?;
		info!("Deleted identity");
		Ok(())
	}
}

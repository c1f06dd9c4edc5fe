//! Persistence of identity records.
//!
//! The store owns exactly one invariant beyond plain storage: `user_id` is unique.
//! Concurrent registrations of the same key race on [`IdentityStore::insert`], and the
//! loser gets [`StoreError::DuplicateKey`] no matter what an earlier `exists` said.

use crate::identity::{Identity, IdentityRecord};

use async_trait::async_trait;

mod memory;
mod postgres;

pub use memory::MemoryIdentityStore;
pub use postgres::PgIdentityStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
	#[error("identity already exists: <user_id='{0}'>")]
	DuplicateKey(String),
	#[error("identity not found: <user_id='{0}'>")]
	NotFound(String),
	#[error("embedding is {got} values wide, the store holds vectors of {expected}")]
	DimensionMismatch { expected: usize, got: usize },
	#[error("existing `users` table doesn't match: {0}")]
	SchemaMismatch(String),
	#[error("stored embedding is missing or has the wrong width: <user_id='{0}'>")]
	CorruptEmbedding(String),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait IdentityStore: Send + Sync {
	/// Width every stored embedding must have (`5 * D`).
	fn vector_width(&self) -> usize;

	/// Prepares the schema. Idempotent, called on every startup.
	async fn init(&self) -> Result<(), StoreError>;

	async fn exists(&self, user_id: &str) -> Result<bool, StoreError>;

	/// Persists the whole record or nothing.
	async fn insert(&self, record: IdentityRecord) -> Result<(), StoreError>;

	async fn get(&self, user_id: &str) -> Result<Option<IdentityRecord>, StoreError>;

	/// Every identity, oldest registration first. Embeddings are not loaded.
	async fn list_all(&self) -> Result<Vec<Identity>, StoreError>;

	async fn delete_by_key(&self, user_id: &str) -> Result<(), StoreError>;
}

/// Rejects records whose vector doesn't match the store's width before any I/O happens.
pub(crate) fn check_width(expected: usize, record: &IdentityRecord) -> Result<(), StoreError> {
	let got = record.embedding.len();
	if got == expected {
		Ok(())
	} else {
		Err(StoreError::DimensionMismatch { expected, got })
	}
}

use super::{check_width, IdentityStore, StoreError};
use crate::identity::{Identity, IdentityRecord};

use std::collections::{hash_map::Entry, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Keeps identities in process memory. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryIdentityStore {
	width: usize,
	records: RwLock<HashMap<String, IdentityRecord>>,
}

impl MemoryIdentityStore {
	#[must_use]
	pub fn new(width: usize) -> Self {
		Self {
			width,
			records: RwLock::default(),
		}
	}
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
	fn vector_width(&self) -> usize {
		self.width
	}

	async fn init(&self) -> Result<(), StoreError> {
		debug!(width = self.width, "Using in-memory identity store");
		Ok(())
	}

	async fn exists(&self, user_id: &str) -> Result<bool, StoreError> {
		Ok(self.records.read().await.contains_key(user_id))
	}

	async fn insert(&self, record: IdentityRecord) -> Result<(), StoreError> {
		check_width(self.width, &record)?;

		match self
			.records
			.write()
			.await
			.entry(record.identity.user_id.clone())
		{
			Entry::Occupied(entry) => Err(StoreError::DuplicateKey(entry.key().clone())),
			Entry::Vacant(entry) => {
				entry.insert(record);
				Ok(())
			}
		}
	}

	async fn get(&self, user_id: &str) -> Result<Option<IdentityRecord>, StoreError> {
		Ok(self.records.read().await.get(user_id).cloned())
	}

	async fn list_all(&self) -> Result<Vec<Identity>, StoreError> {
		let mut identities = self
			.records
			.read()
			.await
			.values()
			.map(|record| record.identity.clone())
			.collect::<Vec<_>>();

		identities.sort_by(|a, b| {
			a.registration_date
				.cmp(&b.registration_date)
				.then_with(|| a.user_id.cmp(&b.user_id))
		});

		Ok(identities)
	}

	async fn delete_by_key(&self, user_id: &str) -> Result<(), StoreError> {
		self.records
			.write()
			.await
			.remove(user_id)
			.map(|_| ())
			.ok_or_else(|| StoreError::NotFound(user_id.to_string()))
	}
}

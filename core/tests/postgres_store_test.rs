//! Runs against a real PostgreSQL with `pgvector` when `FR_TEST_DATABASE_URL` is set,
//! e.g. `postgres://postgres@localhost:5432/face_registration_test`.

use fr_ai::{ConcatenatedEmbedding, ANGLE_COUNT, EMBEDDING_DIMENSIONS};
use fr_core::{
	config::DatabaseConfig, IdentityRecord, IdentityStore, NewIdentity, PgIdentityStore,
	StoreError,
};

use chrono::{SubsecRound, Utc};
use pretty_assertions::assert_eq;

async fn store() -> Option<PgIdentityStore> {
	let Ok(url) = std::env::var("FR_TEST_DATABASE_URL") else {
		eprintln!("FR_TEST_DATABASE_URL not set, skipping");
		return None;
	};

	let store = PgIdentityStore::connect(
		&DatabaseConfig::default(),
		&url,
		EMBEDDING_DIMENSIONS * ANGLE_COUNT,
	)
	.await
	.expect("connect to test database");

	// Twice on purpose, startup must be idempotent
	store.init().await.expect("init schema");
	store.init().await.expect("re-init schema");

	Some(store)
}

fn record(user_id: &str) -> IdentityRecord {
	let mut values = vec![0.0; EMBEDDING_DIMENSIONS * ANGLE_COUNT];
	values[0] = 1.0;

	IdentityRecord {
		identity: NewIdentity {
			user_id: user_id.to_string(),
			username: "Katherine Johnson".to_string(),
			department: "Flight Research".to_string(),
			designation: "Mathematician".to_string(),
		}
		// Postgres keeps microseconds
		.registered_at(Utc::now().trunc_subsecs(6)),
		embedding: ConcatenatedEmbedding::from_values(values, EMBEDDING_DIMENSIONS)
			.expect("correct width"),
	}
}

#[tokio::test]
async fn round_trips_records_and_enforces_unique_keys() -> Result<(), Box<dyn std::error::Error>> {
	let Some(store) = store().await else {
		return Ok(());
	};

	let user_id = format!("pg-test-{}", Utc::now().timestamp_micros());
	let original = record(&user_id);

	store.insert(original.clone()).await?;
	assert!(store.exists(&user_id).await?);
	assert_eq!(store.get(&user_id).await?, Some(original));

	assert!(matches!(
		store.insert(record(&user_id)).await,
		Err(StoreError::DuplicateKey(key)) if key == user_id
	));

	assert!(store
		.list_all()
		.await?
		.iter()
		.any(|identity| identity.user_id == user_id));

	store.delete_by_key(&user_id).await?;
	assert!(!store.exists(&user_id).await?);
	assert!(matches!(
		store.delete_by_key(&user_id).await,
		Err(StoreError::NotFound(_))
	));

	Ok(())
}

#[tokio::test]
async fn existing_table_of_another_width_fails_init() -> Result<(), Box<dyn std::error::Error>> {
	// Creates the table at the default width first
	let Some(_) = store().await else {
		return Ok(());
	};
	let url = std::env::var("FR_TEST_DATABASE_URL")?;

	let narrower = PgIdentityStore::connect(
		&DatabaseConfig::default(),
		&url,
		EMBEDDING_DIMENSIONS * ANGLE_COUNT - 1,
	)
	.await?;

	assert!(matches!(
		narrower.init().await,
		Err(StoreError::SchemaMismatch(_))
	));

	Ok(())
}

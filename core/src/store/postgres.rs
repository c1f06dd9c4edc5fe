use super::{check_width, IdentityStore, StoreError};
use crate::{
	config::DatabaseConfig,
	identity::{Identity, IdentityRecord},
};

use fr_ai::{ConcatenatedEmbedding, ANGLE_COUNT};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use sqlx::{
	postgres::{PgPool, PgPoolOptions},
	FromRow,
};
use tracing::{debug, info};

/// Columns every operation reads or writes, `embeddings` is checked separately
const REQUIRED_COLUMNS: [&str; 5] = [
	"user_id",
	"username",
	"department",
	"designation",
	"registration_date",
];

/// Identities in PostgreSQL, embeddings in a `pgvector` column so they can be searched.
///
/// Every operation checks a connection out of the pool for its own duration only; the
/// connection goes back when the guard drops, on success and error paths alike.
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
	pool: PgPool,
	width: usize,
}

#[derive(FromRow)]
struct IdentityRow {
	user_id: String,
	username: String,
	department: Option<String>,
	designation: Option<String>,
	registration_date: DateTime<Utc>,
}

impl From<IdentityRow> for Identity {
	fn from(row: IdentityRow) -> Self {
		Self {
			user_id: row.user_id,
			username: row.username,
			department: row.department.unwrap_or_default(),
			designation: row.designation.unwrap_or_default(),
			registration_date: row.registration_date,
		}
	}
}

#[derive(FromRow)]
struct RecordRow {
	#[sqlx(flatten)]
	identity: IdentityRow,
	embeddings: Option<Vector>,
}

impl PgIdentityStore {
	pub async fn connect(config: &DatabaseConfig, url: &str, width: usize) -> Result<Self, StoreError> {
		let pool = PgPoolOptions::new()
			.max_connections(config.max_connections)
			.acquire_timeout(config.acquire_timeout())
			.connect(url)
			.await?;

		debug!(max_connections = config.max_connections, "Connected to PostgreSQL");

		Ok(Self::from_pool(pool, width))
	}

	#[must_use]
	pub const fn from_pool(pool: PgPool, width: usize) -> Self {
		Self { pool, width }
	}

	fn schema(&self) -> String {
		format!(
			"CREATE TABLE IF NOT EXISTS users (
				user_id VARCHAR(50) PRIMARY KEY,
				username VARCHAR(100) NOT NULL,
				department VARCHAR(100),
				designation VARCHAR(100),
				registration_date TIMESTAMPTZ NOT NULL DEFAULT now(),
				embeddings vector({})
			)",
			self.width
		)
	}
}

/// Fails unless `columns` (name, formatted type) can hold records `width` values wide.
fn check_columns(columns: &[(String, String)], width: usize) -> Result<(), StoreError> {
	let type_of = |name: &str| {
		columns
			.iter()
			.find(|(column, _)| column == name)
			.map(|(_, ty)| ty.as_str())
	};

	if let Some(missing) = REQUIRED_COLUMNS
		.into_iter()
		.find(|&name| type_of(name).is_none())
	{
		return Err(StoreError::SchemaMismatch(format!(
			"column `{missing}` is missing"
		)));
	}

	let expected = format!("vector({width})");
	match type_of("embeddings") {
		Some(ty) if ty == expected => Ok(()),
		Some(ty) => Err(StoreError::SchemaMismatch(format!(
			"`embeddings` is `{ty}`, expected `{expected}`"
		))),
		None => Err(StoreError::SchemaMismatch(
			"column `embeddings` is missing".to_string(),
		)),
	}
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
	fn vector_width(&self) -> usize {
		self.width
	}

	async fn init(&self) -> Result<(), StoreError> {
		let mut conn = self.pool.acquire().await?;

		sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
			.execute(&mut *conn)
			.await?;
		sqlx::query(&self.schema()).execute(&mut *conn).await?;

		// `IF NOT EXISTS` happily keeps a table created by someone else
		let columns = sqlx::query_as::<_, (String, String)>(
			"SELECT a.attname::text, format_type(a.atttypid, a.atttypmod)
			FROM pg_attribute a
			WHERE a.attrelid = 'users'::regclass AND a.attnum > 0 AND NOT a.attisdropped",
		)
		.fetch_all(&mut *conn)
		.await?;
		check_columns(&columns, self.width)?;

		info!(width = self.width, "Identity table ready");

		Ok(())
	}

	async fn exists(&self, user_id: &str) -> Result<bool, StoreError> {
		let mut conn = self.pool.acquire().await?;

		Ok(
			sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
				.bind(user_id)
				.fetch_one(&mut *conn)
				.await?,
		)
	}

	async fn insert(&self, record: IdentityRecord) -> Result<(), StoreError> {
		check_width(self.width, &record)?;

		let IdentityRecord {
			identity,
			embedding,
		} = record;

		let mut conn = self.pool.acquire().await?;

		sqlx::query(
			"INSERT INTO users (user_id, username, department, designation, registration_date, embeddings)
			VALUES ($1, $2, $3, $4, $5, $6)",
		)
		.bind(&identity.user_id)
		.bind(&identity.username)
		.bind(&identity.department)
		.bind(&identity.designation)
		.bind(identity.registration_date)
		.bind(Vector::from(embedding.into_inner()))
		.execute(&mut *conn)
		.await
		.map_err(|e| match e {
			sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
				StoreError::DuplicateKey(identity.user_id.clone())
			}
			e => StoreError::Database(e),
		})?;

		Ok(())
	}

	async fn get(&self, user_id: &str) -> Result<Option<IdentityRecord>, StoreError> {
		let mut conn = self.pool.acquire().await?;

		let Some(row) = sqlx::query_as::<_, RecordRow>(
			"SELECT user_id, username, department, designation, registration_date, embeddings
			FROM users WHERE user_id = $1",
		)
		.bind(user_id)
		.fetch_optional(&mut *conn)
		.await?
		else {
			return Ok(None);
		};

		let embedding = row
			.embeddings
			.and_then(|vector| {
				ConcatenatedEmbedding::from_values(vector.to_vec(), self.width / ANGLE_COUNT)
			})
			.ok_or_else(|| StoreError::CorruptEmbedding(user_id.to_string()))?;

		Ok(Some(IdentityRecord {
			identity: row.identity.into(),
			embedding,
		}))
	}

	async fn list_all(&self) -> Result<Vec<Identity>, StoreError> {
		let mut conn = self.pool.acquire().await?;

		Ok(sqlx::query_as::<_, IdentityRow>(
			"SELECT user_id, username, department, designation, registration_date
			FROM users ORDER BY registration_date, user_id",
		)
		.fetch_all(&mut *conn)
		.await?
		.into_iter()
		.map(Identity::from)
		.collect())
	}

	async fn delete_by_key(&self, user_id: &str) -> Result<(), StoreError> {
		let mut conn = self.pool.acquire().await?;

		let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
			.bind(user_id)
			.execute(&mut *conn)
			.await?;

		if result.rows_affected() == 0 {
			return Err(StoreError::NotFound(user_id.to_string()));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn columns(embeddings: Option<&str>) -> Vec<(String, String)> {
		REQUIRED_COLUMNS
			.into_iter()
			.map(|name| (name.to_string(), "character varying(100)".to_string()))
			.chain(embeddings.map(|ty| ("embeddings".to_string(), ty.to_string())))
			.collect()
	}

	#[test]
	fn matching_table_is_accepted() {
		assert!(check_columns(&columns(Some("vector(2560)")), 2560).is_ok());
	}

	#[test]
	fn other_vector_width_is_refused() {
		assert!(matches!(
			check_columns(&columns(Some("vector(512)")), 2560),
			Err(StoreError::SchemaMismatch(detail)) if detail.contains("vector(512)")
		));
		assert!(matches!(
			check_columns(&columns(Some("double precision[]")), 2560),
			Err(StoreError::SchemaMismatch(_))
		));
	}

	#[test]
	fn missing_columns_are_refused() {
		assert!(matches!(
			check_columns(&columns(None), 2560),
			Err(StoreError::SchemaMismatch(detail)) if detail.contains("embeddings")
		));

		let without_date = columns(Some("vector(2560)"))
			.into_iter()
			.filter(|(name, _)| name != "registration_date")
			.collect::<Vec<_>>();
		assert!(matches!(
			check_columns(&without_date, 2560),
			Err(StoreError::SchemaMismatch(detail)) if detail.contains("registration_date")
		));
	}
}

use fr_ai::ConcatenatedEmbedding;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Width of the `user_id` column
pub const USER_ID_MAX_LEN: usize = 50;
/// Width of every other text column
pub const FIELD_MAX_LEN: usize = 100;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
	#[error("All user fields are required: `{0}` is empty")]
	Empty(&'static str),
	#[error("`{field}` is longer than {max} characters")]
	TooLong { field: &'static str, max: usize },
}

/// Identity metadata as submitted for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdentity {
	pub user_id: String,
	pub username: String,
	pub department: String,
	pub designation: String,
}

impl NewIdentity {
	/// Trims surrounding whitespace from every field.
	#[must_use]
	pub fn normalized(self) -> Self {
		let trim = |field: String| field.trim().to_string();
		Self {
			user_id: trim(self.user_id),
			username: trim(self.username),
			department: trim(self.department),
			designation: trim(self.designation),
		}
	}

	pub fn validate(&self) -> Result<(), ValidationError> {
		for (field, value, max) in [
			("user_id", &self.user_id, USER_ID_MAX_LEN),
			("username", &self.username, FIELD_MAX_LEN),
			("department", &self.department, FIELD_MAX_LEN),
			("designation", &self.designation, FIELD_MAX_LEN),
		] {
			if value.trim().is_empty() {
				return Err(ValidationError::Empty(field));
			}

			if value.chars().count() > max {
				return Err(ValidationError::TooLong { field, max });
			}
		}

		Ok(())
	}

	#[must_use]
	pub fn registered_at(self, registration_date: DateTime<Utc>) -> Identity {
		Identity {
			user_id: self.user_id,
			username: self.username,
			department: self.department,
			designation: self.designation,
			registration_date,
		}
	}
}

/// A registered person, without their embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub user_id: String,
	pub username: String,
	pub department: String,
	pub designation: String,
	pub registration_date: DateTime<Utc>,
}

/// What the store persists: an identity and its concatenated embedding, all or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
	pub identity: Identity,
	pub embedding: ConcatenatedEmbedding,
}

#[cfg(test)]
mod tests {
	use super::*;

	use pretty_assertions::assert_eq;

	fn identity() -> NewIdentity {
		NewIdentity {
			user_id: "u1".to_string(),
			username: "Ada Lovelace".to_string(),
			department: "Engineering".to_string(),
			designation: "Analyst".to_string(),
		}
	}

	#[test]
	fn complete_identity_is_valid() {
		assert_eq!(identity().validate(), Ok(()));
	}

	#[test]
	fn blank_fields_are_rejected() {
		let mut blank = identity();
		blank.department = "   ".to_string();
		assert_eq!(blank.validate(), Err(ValidationError::Empty("department")));

		let mut empty = identity();
		empty.user_id = String::new();
		assert_eq!(empty.validate(), Err(ValidationError::Empty("user_id")));
	}

	#[test]
	fn overlong_fields_are_rejected() {
		let mut long = identity();
		long.user_id = "x".repeat(USER_ID_MAX_LEN + 1);

		assert_eq!(
			long.validate(),
			Err(ValidationError::TooLong {
				field: "user_id",
				max: USER_ID_MAX_LEN
			})
		);
	}

	#[test]
	fn normalizing_trims_fields() {
		let mut padded = identity();
		padded.user_id = "  u1 ".to_string();

		assert_eq!(padded.normalized(), identity());
	}
}

use super::{
	error::{ApiError, ApiJson},
	AppState,
};

use fr_ai::{Angle, AngleMap};
use fr_core::{Identity, NewIdentity};

use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoData {
	angle: String,
	/// base64, optionally as a data URI
	image_data: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserRegistration {
	user: NewIdentity,
	#[serde(default)]
	photos: Vec<PhotoData>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UsersResponse {
	users: Vec<Identity>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisteredResponse {
	message: &'static str,
	user_id: String,
	photos_processed: usize,
	embedding_dimensions: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
	message: &'static str,
}

/// Unknown angles are dropped here so they never reach the assembler.
fn angle_map(photos: Vec<PhotoData>) -> AngleMap {
	photos
		.into_iter()
		.filter_map(|PhotoData { angle, image_data }| match angle.parse::<Angle>() {
			Ok(parsed) => Some((parsed, image_data)),
			Err(_) => {
				warn!(%angle, "Ignoring photo with an unknown angle");
				None
			}
		})
		.collect()
}

pub(crate) async fn list(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
	Ok(Json(UsersResponse {
		users: state.registrations.list_identities().await?,
	}))
}

pub(crate) async fn register(
	State(state): State<AppState>,
	ApiJson(UserRegistration { user, photos }): ApiJson<UserRegistration>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
	let summary = state
		.registrations
		.register(user, angle_map(photos))
		.await?;

	Ok((
		StatusCode::CREATED,
		Json(RegisteredResponse {
			message: "User registered successfully with face embeddings",
			user_id: summary.user_id,
			photos_processed: summary.photos_processed,
			embedding_dimensions: summary.embedding_dimensions,
		}),
	))
}

pub(crate) async fn delete(
	State(state): State<AppState>,
	Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
	state.registrations.delete_identity(&user_id).await?;

	Ok(Json(MessageResponse {
		message: "User deleted successfully",
	}))
}

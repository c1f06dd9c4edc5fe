use fr_core::RegistrationError;

use axum::{
	extract::{rejection::JsonRejection, FromRequest},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde_json::json;
use tracing::error;

/// `Json` whose rejections are rendered like every other [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub(crate) struct ApiJson<T>(pub T);

/// An error ready to go over the wire as `{"detail": "..."}`.
#[derive(Debug)]
pub(crate) struct ApiError {
	status: StatusCode,
	detail: String,
}

impl From<RegistrationError> for ApiError {
	fn from(e: RegistrationError) -> Self {
		let status = match &e {
			RegistrationError::Validation(_)
			| RegistrationError::DuplicateKey(_)
			| RegistrationError::EmbeddingFailure { .. } => StatusCode::BAD_REQUEST,

			RegistrationError::NotFound(_) => StatusCode::NOT_FOUND,

			RegistrationError::Store(_) => {
				error!("Store operation failed: {e:#?}");
				StatusCode::INTERNAL_SERVER_ERROR
			}
		};

		Self {
			status,
			detail: e.to_string(),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self {
			status: rejection.status(),
			detail: rejection.body_text(),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(json!({ "detail": self.detail }))).into_response()
	}
}

use fr_core::RegistrationService;

use std::{path::Path, sync::Arc};

use axum::{
	extract::DefaultBodyLimit,
	routing::{delete, get, post},
	Router,
};
use tower_http::{
	services::{ServeDir, ServeFile},
	trace::TraceLayer,
};

mod error;
mod users;

/// Five full-size photos as base64 comfortably fit, anything bigger is not a registration
const MAX_REQUEST_BODY: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub(crate) struct AppState {
	registrations: Arc<RegistrationService>,
}

pub(crate) fn router(registrations: Arc<RegistrationService>, static_dir: Option<&Path>) -> Router {
	let api = Router::new()
		.route("/api/users", get(users::list))
		.route("/api/users/register", post(users::register))
		.route("/api/users/:user_id", delete(users::delete))
		.route("/health", get(|| async { "OK" }))
		.layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
		.with_state(AppState { registrations });

	let app = match static_dir {
		Some(dir) => api
			.route_service("/", ServeFile::new(dir.join("index.html")))
			.nest_service("/static", ServeDir::new(dir)),
		None => api.route("/", get(|| async { "Face Registry Server!" })),
	};

	app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
	use super::*;

	use fr_ai::{test_utils::FakeEmbedder, Assembler, ANGLE_COUNT};
	use fr_core::{
		Identity, IdentityRecord, IdentityStore, MemoryIdentityStore, StoreError,
	};
	use fr_images::test_utils::{sample_face, to_base64_png, to_data_uri};

	use async_trait::async_trait;
	use axum::{
		body::{to_bytes, Body},
		http::{Method, Request, StatusCode},
		response::Response,
	};
	use pretty_assertions::assert_eq;
	use serde_json::{json, Value};
	use tower::ServiceExt;

	const WIDTH: usize = FakeEmbedder::DIMENSIONS * ANGLE_COUNT;

	fn app_with(store: Arc<dyn IdentityStore>) -> Router {
		let registrations = RegistrationService::new(store, Assembler::new(Arc::new(FakeEmbedder)))
			.expect("widths match");
		router(Arc::new(registrations), None)
	}

	fn app() -> Router {
		app_with(Arc::new(MemoryIdentityStore::new(WIDTH)))
	}

	async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
		let request = Request::builder().method(method).uri(uri);
		let request = match body {
			Some(body) => request
				.header("content-type", "application/json")
				.body(Body::from(body.to_string())),
			None => request.body(Body::empty()),
		}
		.unwrap();

		app.clone().oneshot(request).await.unwrap()
	}

	async fn json_body(response: Response) -> Value {
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		serde_json::from_slice(&bytes).unwrap()
	}

	fn registration(user_id: &str, photos: Value) -> Value {
		json!({
			"user": {
				"user_id": user_id,
				"username": "Alan Turing",
				"department": "Cryptanalysis",
				"designation": "Lead",
			},
			"photos": photos,
		})
	}

	fn photos() -> Value {
		json!([
			{ "angle": "front", "image_data": to_data_uri(&sample_face(1)) },
			{ "angle": "left", "image_data": to_base64_png(&sample_face(2)) },
			{ "angle": "behind", "image_data": to_base64_png(&sample_face(3)) },
		])
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn registers_lists_and_deletes_users() {
		let app = app();

		let response = send(
			&app,
			Method::POST,
			"/api/users/register",
			Some(registration("u1", photos())),
		)
		.await;
		assert_eq!(response.status(), StatusCode::CREATED);
		assert_eq!(
			json_body(response).await,
			json!({
				"message": "User registered successfully with face embeddings",
				"user_id": "u1",
				"photos_processed": 2,
				"embedding_dimensions": WIDTH,
			})
		);

		let response = send(&app, Method::GET, "/api/users", None).await;
		assert_eq!(response.status(), StatusCode::OK);
		let body = json_body(response).await;
		let users = body["users"].as_array().unwrap();
		assert_eq!(users.len(), 1);
		assert_eq!(users[0]["user_id"], "u1");
		assert_eq!(users[0]["designation"], "Lead");
		assert!(users[0]["registration_date"].is_string());
		assert!(users[0].get("embeddings").is_none());

		let response = send(&app, Method::DELETE, "/api/users/u1", None).await;
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(
			json_body(response).await,
			json!({ "message": "User deleted successfully" })
		);

		let response = send(&app, Method::DELETE, "/api/users/u1", None).await;
		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		assert!(json_body(response).await["detail"].is_string());
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn client_errors_are_bad_requests() {
		let app = app();

		let mut blank = registration("u1", photos());
		blank["user"]["department"] = json!("");
		let response = send(&app, Method::POST, "/api/users/register", Some(blank)).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let undecodable = registration(
			"u1",
			json!([{ "angle": "front", "image_data": "data:image/png;base64,!!!" }]),
		);
		let response = send(&app, Method::POST, "/api/users/register", Some(undecodable)).await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);

		let response = send(
			&app,
			Method::POST,
			"/api/users/register",
			Some(registration("u1", photos())),
		)
		.await;
		assert_eq!(response.status(), StatusCode::CREATED);

		let response = send(
			&app,
			Method::POST,
			"/api/users/register",
			Some(registration("u1", photos())),
		)
		.await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert!(json_body(response).await["detail"]
			.as_str()
			.unwrap()
			.contains("already exists"));
	}

	async fn post_raw(app: &Router, body: &str) -> Response {
		let request = Request::builder()
			.method(Method::POST)
			.uri("/api/users/register")
			.header("content-type", "application/json")
			.body(Body::from(body.to_string()))
			.unwrap();

		app.clone().oneshot(request).await.unwrap()
	}

	#[tokio::test]
	async fn malformed_bodies_still_get_a_json_detail() {
		let app = app();

		let mut missing = registration("u1", photos());
		missing["user"]
			.as_object_mut()
			.unwrap()
			.remove("designation");

		let mut null = registration("u1", photos());
		null["user"]["designation"] = Value::Null;

		for (body, status) in [
			(missing.to_string(), StatusCode::UNPROCESSABLE_ENTITY),
			(null.to_string(), StatusCode::UNPROCESSABLE_ENTITY),
			("{not json".to_string(), StatusCode::BAD_REQUEST),
		] {
			let response = post_raw(&app, &body).await;
			assert_eq!(response.status(), status, "{body}");
			assert_eq!(
				response.headers()["content-type"],
				"application/json",
				"{body}"
			);
			assert!(json_body(response).await["detail"].is_string(), "{body}");
		}

		let response = post_raw(&app, &missing.to_string()).await;
		assert!(json_body(response).await["detail"]
			.as_str()
			.unwrap()
			.contains("designation"));
	}

	struct BrokenStore;

	#[async_trait]
	impl IdentityStore for BrokenStore {
		fn vector_width(&self) -> usize {
			WIDTH
		}

		async fn init(&self) -> Result<(), StoreError> {
			Ok(())
		}

		async fn exists(&self, user_id: &str) -> Result<bool, StoreError> {
			Err(StoreError::CorruptEmbedding(user_id.to_string()))
		}

		async fn insert(&self, record: IdentityRecord) -> Result<(), StoreError> {
			Err(StoreError::CorruptEmbedding(record.identity.user_id))
		}

		async fn get(&self, user_id: &str) -> Result<Option<IdentityRecord>, StoreError> {
			Err(StoreError::CorruptEmbedding(user_id.to_string()))
		}

		async fn list_all(&self) -> Result<Vec<Identity>, StoreError> {
			Err(StoreError::CorruptEmbedding("*".to_string()))
		}

		async fn delete_by_key(&self, user_id: &str) -> Result<(), StoreError> {
			Err(StoreError::CorruptEmbedding(user_id.to_string()))
		}
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn store_failures_are_server_errors() {
		let app = app_with(Arc::new(BrokenStore));

		for (method, uri, body) in [
			(Method::GET, "/api/users", None),
			(
				Method::POST,
				"/api/users/register",
				Some(registration("u1", photos())),
			),
			(Method::DELETE, "/api/users/u1", None),
		] {
			let response = send(&app, method, uri, body).await;
			assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
		}
	}

	#[tokio::test]
	async fn serves_the_registration_page() {
		let dir = tempfile::TempDir::new().unwrap();
		std::fs::write(dir.path().join("index.html"), "<h1>Register</h1>").unwrap();
		std::fs::write(dir.path().join("app.js"), "console.log('hi')").unwrap();

		let registrations = RegistrationService::new(
			Arc::new(MemoryIdentityStore::new(WIDTH)),
			Assembler::new(Arc::new(FakeEmbedder)),
		)
		.unwrap();
		let app = router(Arc::new(registrations), Some(dir.path()));

		let response = send(&app, Method::GET, "/", None).await;
		assert_eq!(response.status(), StatusCode::OK);
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		assert_eq!(&bytes[..], b"<h1>Register</h1>");

		let response = send(&app, Method::GET, "/static/app.js", None).await;
		assert_eq!(response.status(), StatusCode::OK);

		let response = send(&app, Method::GET, "/health", None).await;
		assert_eq!(response.status(), StatusCode::OK);
	}
}

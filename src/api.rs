//! HTTP surface: routes, handlers, and error → response mapping.
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | POST | `/api/login` | credential check |
//! | GET | `/api/photos` | list all photos |
//! | POST | `/api/upload` | multipart upload (`photo` file + `title` text) |
//! | PUT | `/api/photo/{id}` | update a photo's title |
//! | DELETE | `/api/photo/{id}` | delete a photo and its file |
//!
//! `/uploads` additionally serves the normalized files, and CORS is open to
//! all origins — both for the benefit of the browser frontend, which is a
//! separate bundle.
//!
//! 4xx responses say what the client did wrong. 5xx responses carry only a
//! generic message; the failure detail is logged here and never leaks.

use crate::auth::Authenticator;
use crate::pipeline::{IncomingUpload, PUBLIC_PREFIX, UploadError, UploadPipeline};
use crate::repo::{Photo, PhotoRepository, RepoError};
use crate::store::FileStore;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, warn};

/// Hard cap on upload request bodies (10 MiB).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Everything the handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<PhotoRepository>,
    pub store: FileStore,
    pub pipeline: Arc<UploadPipeline>,
    pub auth: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        repo: Arc<PhotoRepository>,
        store: FileStore,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        let pipeline = Arc::new(UploadPipeline::new(store.clone(), Arc::clone(&repo)));
        Self {
            repo,
            store,
            pipeline,
            auth,
        }
    }
}

/// Build the application router. `uploads_dir` is the on-disk directory
/// mounted at `/uploads`.
pub fn router(state: AppState, uploads_dir: &std::path::Path) -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/photos", get(list_photos))
        .route("/api/upload", post(upload_photo))
        .route("/api/photo/{id}", put(update_photo).delete(delete_photo))
        .nest_service(&format!("/{PUBLIC_PREFIX}"), ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler-level failure, mapped to a status + `{"error": …}` body.
#[derive(Debug, PartialEq)]
enum ApiError {
    BadRequest(String),
    NotFound(&'static str),
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(_) => ApiError::NotFound("Photo not found"),
            RepoError::Database(_) => {
                error!("database error: {err}");
                ApiError::Internal("Failed to access photo store")
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        let generic = match &err {
            UploadError::RejectedInput(_) => {
                return ApiError::BadRequest("Invalid file type".to_string());
            }
            UploadError::Io(_) => "Failed to save file",
            UploadError::Conversion(_) => "Failed to convert image",
            UploadError::Metadata(_) => "Failed to read stored file",
            UploadError::Persistence(_) => "Failed to save photo metadata",
        };
        error!("upload failed: {err}");
        ApiError::Internal(generic)
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    title: String,
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return ApiError::BadRequest("Invalid request payload".to_string()).into_response();
    };
    if state.auth.verify(&req.username, &req.password) {
        Json(json!({ "success": true, "message": "Login successful" })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn list_photos(State(state): State<AppState>) -> Result<Json<Vec<Photo>>, ApiError> {
    Ok(Json(state.repo.list_all()?))
}

async fn upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut title = String::new();
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed_upload)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                title = field.text().await.map_err(malformed_upload)?;
            }
            Some("photo") => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(malformed_upload)?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return Err(ApiError::BadRequest("No file uploaded".to_string()));
    };

    let photo = state.pipeline.ingest(IncomingUpload {
        filename,
        content_type,
        title,
        bytes,
    })?;
    Ok(Json(json!({ "success": true, "photo": photo })))
}

async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let Ok(Json(req)) = payload else {
        return Err(ApiError::BadRequest("Invalid request payload".to_string()));
    };

    // Only the title is mutable; every other field is carried over as-is.
    let mut photo = state.repo.get(id)?;
    photo.title = req.title;
    state.repo.update(&photo)?;
    Ok(Json(json!({ "success": true, "photo": photo })))
}

async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let photo = state.repo.get(id)?;

    // Best-effort: a file that cannot be removed does not block deleting
    // the record, it just leaves a stray file behind.
    if let Err(err) = state.store.remove(&photo.filename) {
        warn!("failed to delete {}: {err}", photo.filename);
    }

    state.repo.delete(id)?;
    Ok(Json(json!({ "success": true, "message": "Photo deleted successfully" })))
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid photo ID".to_string()))
}

fn malformed_upload(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Malformed upload body: {err}"))
}

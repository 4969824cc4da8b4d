//! API service routes

use auth::{middleware::require_active_user, models::User};
use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use media::{StagedFile, UploadRequest};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    AppState,
    config::ServerConfig,
    error::{ApiError, ApiResult},
    models::{DeleteResponse, FeedResponse, HealthResponse},
    repositories::DeleteOutcome,
};

/// Create the router for the whole service: auth and user routes plus the
/// post routes, all behind CORS, request tracing and the body size cap.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let auth_routes = auth::routes::create_router(state.auth.clone());

    let protected_routes = Router::new()
        .route("/upload", post(upload))
        .route("/feed", get(feed))
        .route("/posts/:id", delete(delete_post))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_active_user,
        ));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_origins.clone()))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
        .merge(auth_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match common::database::health_check(&state.db_pool).await {
        Ok(true) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database: "connected".to_string(),
            }),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded".to_string(),
                database: "unreachable".to_string(),
            }),
        ),
    }
}

/// Accept a multipart upload (`file`, optional `caption`) and publish it
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut caption = String::new();
    let mut upload: Option<(StagedFile, String, Option<String>)> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);

                let mut staged = StagedFile::create(&file_name)?;
                while let Some(chunk) = field.chunk().await? {
                    staged.write_chunk(&chunk).await?;
                }

                upload = Some((staged, file_name, content_type));
            }
            Some("caption") => caption = field.text().await?,
            _ => {}
        }
    }

    let Some((staged, file_name, content_type)) = upload else {
        return Err(ApiError::BadRequest("No file provided".to_string()));
    };

    info!(
        "User {} uploading {} ({} bytes)",
        user.id,
        file_name,
        staged.size()
    );

    let post = state
        .upload_gateway
        .upload(
            staged,
            UploadRequest {
                owner_id: user.id,
                caption,
                file_name,
                content_type,
            },
        )
        .await?;

    Ok(Json(post))
}

/// Every post, newest first, annotated for the caller
pub async fn feed(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> ApiResult<impl IntoResponse> {
    let posts = state.post_repository.feed(user.id).await.map_err(|e| {
        error!("Failed to load feed: {}", e);
        ApiError::Database(e)
    })?;

    Ok(Json(FeedResponse { posts }))
}

/// Delete one of the caller's posts
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    match state.post_repository.delete_owned(id, user.id).await? {
        DeleteOutcome::Deleted => Ok(Json(DeleteResponse {
            success: true,
            message: "Post deleted successfully".to_string(),
        })),
        DeleteOutcome::NotFound => Err(ApiError::NotFound("Post not found".to_string())),
        DeleteOutcome::Forbidden => Err(ApiError::Forbidden(
            "You can only delete your own posts".to_string(),
        )),
    }
}

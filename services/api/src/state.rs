//! Application state shared across handlers

use auth::AuthState;
use media::{Database, MediaHost, UploadGateway};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::repositories::PostRepository;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub auth: AuthState,
    pub post_repository: PostRepository,
    pub upload_gateway: UploadGateway,
}

impl AppState {
    pub fn new(pool: SqlitePool, auth: AuthState, media_host: Arc<dyn MediaHost>) -> Self {
        Self {
            post_repository: PostRepository::new(pool.clone()),
            upload_gateway: UploadGateway::new(media_host, Database::new(pool.clone())),
            auth,
            db_pool: pool,
        }
    }
}

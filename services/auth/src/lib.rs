//! Authentication for the FeedHub backend
//!
//! Accounts live in the shared row store; sessions are HS256 JWTs carried in
//! an HTTP-only cookie. The crate exposes the auth/user routes and the
//! [`middleware::require_active_user`] layer other services put in front of
//! their protected routes.

pub mod error;
pub mod jwt;
pub mod manager;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod validation;

use sqlx::SqlitePool;

use crate::{
    jwt::{JwtConfig, JwtService},
    manager::UserManager,
    repositories::UserRepository,
    session::{CookieConfig, SessionManager},
};

/// Application state shared across authentication handlers
#[derive(Clone)]
pub struct AuthState {
    pub sessions: SessionManager,
    pub users: UserManager,
}

impl AuthState {
    /// Wire the authentication services over a database pool
    pub fn new(pool: SqlitePool, jwt_config: JwtConfig, cookie_config: CookieConfig) -> Self {
        let jwt_service = JwtService::new(jwt_config);
        let user_repository = UserRepository::new(pool);

        Self {
            sessions: SessionManager::new(
                jwt_service.clone(),
                user_repository.clone(),
                cookie_config,
            ),
            users: UserManager::new(user_repository, jwt_service),
        }
    }
}

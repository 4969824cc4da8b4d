//! Middleware gating routes on an authenticated, active user

use axum::{extract::Request, extract::State, middleware::Next, response::Response};

use crate::{AuthState, error::AuthError};

/// Resolve the session cookie into a [`User`](crate::models::User) and store
/// it in the request extensions, rejecting the request with 401 otherwise.
pub async fn require_active_user(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = state.sessions.authenticate(req.headers()).await?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

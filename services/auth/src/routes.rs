//! Authentication and user management routes

use axum::{
    Extension, Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    AuthState,
    error::AuthError,
    middleware::require_active_user,
    models::{LoginForm, User, UserCreate, UserRead, UserUpdate},
};

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Request carrying only an email
#[derive(Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Request for a password reset
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Request for email verification
#[derive(Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

/// Create the router for authentication and user management
pub fn create_router(state: AuthState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/jwt/login-response", post(login_response))
        .route("/users/me", get(get_me).patch(update_me))
        .route("/users/:id", get(get_user).patch(update_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_active_user,
        ));

    Router::new()
        .route("/auth/jwt/login", post(login))
        .route("/auth/jwt/logout", post(logout))
        .route("/auth/register", post(register))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/request-verify-token", post(request_verify_token))
        .route("/auth/verify", post(verify))
        .merge(protected_routes)
        .with_state(state)
}

/// User login endpoint; the session travels in the auth cookie
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AuthError> {
    let (user, cookie) = state.sessions.login(&form.username, &form.password).await?;

    let response = LoginResponse {
        user_id: user.id,
        message: "Login successful".to_string(),
    };

    Ok((jar.add(cookie), Json(response)))
}

/// Current user, used by clients right after the cookie login
pub async fn login_response(Extension(user): Extension<User>) -> Json<UserRead> {
    Json(UserRead::from(&user))
}

/// Logout endpoint. Always succeeds; it only tells the browser to drop the cookie.
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(state.sessions.logout_cookie()),
        Json(json!({"message": "Successfully logged out"})),
    )
}

/// Registration endpoint
pub async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<UserCreate>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state.users.register(&payload).await?;

    Ok((StatusCode::CREATED, Json(UserRead::from(&user))))
}

/// Start a password reset
pub async fn forgot_password(
    State(state): State<AuthState>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.users.forgot_password(&payload.email).await?;

    Ok(Json(json!({
        "message": "If the account exists, a password reset token has been issued"
    })))
}

/// Finish a password reset
pub async fn reset_password(
    State(state): State<AuthState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state
        .users
        .reset_password(&payload.token, &payload.password)
        .await?;

    Ok(Json(json!({"message": "Password has been reset"})))
}

/// Request an email verification token
pub async fn request_verify_token(
    State(state): State<AuthState>,
    Json(payload): Json<EmailRequest>,
) -> Result<impl IntoResponse, AuthError> {
    state.users.request_verify(&payload.email).await?;

    Ok(Json(json!({
        "message": "If the account exists and is unverified, a verification token has been issued"
    })))
}

/// Verify an email address
pub async fn verify(
    State(state): State<AuthState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<UserRead>, AuthError> {
    let user = state.users.verify(&payload.token).await?;

    Ok(Json(UserRead::from(&user)))
}

/// Current user profile
pub async fn get_me(Extension(user): Extension<User>) -> Json<UserRead> {
    Json(UserRead::from(&user))
}

/// Update the current user's email or password
pub async fn update_me(
    State(state): State<AuthState>,
    Extension(user): Extension<User>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserRead>, AuthError> {
    let user = state.users.update(&user, payload, true).await?;

    Ok(Json(UserRead::from(&user)))
}

/// Get any user by ID (superusers only)
pub async fn get_user(
    State(state): State<AuthState>,
    Extension(current): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRead>, AuthError> {
    if !current.is_superuser {
        return Err(AuthError::Forbidden);
    }

    let user = state.users.get(id).await?;

    Ok(Json(UserRead::from(&user)))
}

/// Update any user by ID, including account flags (superusers only)
pub async fn update_user(
    State(state): State<AuthState>,
    Extension(current): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserRead>, AuthError> {
    if !current.is_superuser {
        return Err(AuthError::Forbidden);
    }

    let user = state.users.get(id).await?;
    let user = state.users.update(&user, payload, false).await?;

    Ok(Json(UserRead::from(&user)))
}

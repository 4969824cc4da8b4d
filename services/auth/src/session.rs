//! Cookie-based session management
//!
//! A session is nothing more than a signed JWT carried in an HTTP-only cookie;
//! there is no server-side session table. Logging out clears the cookie, and a
//! token captured before that stays valid until it expires.

use axum::http::HeaderMap;
use axum_extra::{
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use tracing::{debug, info, warn};

use crate::{
    error::AuthError,
    jwt::{JwtService, TokenAudience},
    models::User,
    password,
    repositories::UserRepository,
    validation::normalize_email,
};

/// Auth cookie configuration
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie name
    pub name: String,
    /// Whether the cookie carries the `Secure` flag
    pub secure: bool,
}

impl CookieConfig {
    /// Create a new CookieConfig from environment variables
    ///
    /// # Environment Variables
    /// - `AUTH_COOKIE_NAME`: Cookie name (default: "authToken")
    /// - `AUTH_COOKIE_SECURE`: Set the Secure flag (default: false, must be true behind HTTPS)
    pub fn from_env() -> Self {
        let name = std::env::var("AUTH_COOKIE_NAME").unwrap_or_else(|_| "authToken".to_string());
        let secure = std::env::var("AUTH_COOKIE_SECURE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self { name, secure }
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "authToken".to_string(),
            secure: false,
        }
    }
}

/// Session manager: issues, reads and clears the auth cookie
#[derive(Clone)]
pub struct SessionManager {
    jwt_service: JwtService,
    user_repository: UserRepository,
    cookie: CookieConfig,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(
        jwt_service: JwtService,
        user_repository: UserRepository,
        cookie: CookieConfig,
    ) -> Self {
        Self {
            jwt_service,
            user_repository,
            cookie,
        }
    }

    /// Check credentials and issue a session cookie
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, Cookie<'static>), AuthError> {
        let email = normalize_email(email);
        info!("Login attempt for user: {}", email);

        let Some(user) = self.user_repository.find_by_email(&email).await? else {
            // Burn the same time as a real check so unknown emails are not observable
            password::hash_password(password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.hashed_password).await? {
            warn!("Invalid password for user: {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            warn!("Login refused for inactive user: {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt_service.generate_session_token(&user)?;
        info!("Session issued for user: {}", user.id);

        Ok((user, self.session_cookie(token)))
    }

    /// Resolve the active user behind a request
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<User, AuthError> {
        let token = self.extract_token(headers).ok_or(AuthError::Unauthenticated)?;

        let claims = self
            .jwt_service
            .validate_token(&token, TokenAudience::Session)
            .map_err(|e| {
                debug!("Rejected session token: {}", e);
                AuthError::Unauthenticated
            })?;

        let user = self
            .user_repository
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !user.is_active {
            return Err(AuthError::InactiveAccount);
        }

        Ok(user)
    }

    /// Cookie carrying a freshly issued session token
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let lifetime = i64::try_from(self.jwt_service.session_lifetime()).unwrap_or(i64::MAX);
        let max_age = time::Duration::seconds(lifetime);

        Cookie::build((self.cookie.name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie.secure)
            .max_age(max_age)
            .build()
    }

    /// Removal cookie; name, path and flags match the session cookie so browsers drop it
    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie.name.clone(), String::new()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie.secure)
            .max_age(time::Duration::ZERO)
            .build()
    }

    fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        let jar = CookieJar::from_headers(headers);

        jar.get(&self.cookie.name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| {
                headers
                    .typed_get::<Authorization<Bearer>>()
                    .map(|auth| auth.token().to_string())
            })
    }
}

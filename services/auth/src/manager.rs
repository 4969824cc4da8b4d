//! User management: registration, verification, password reset and profile updates

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::AuthError,
    jwt::{JwtService, TokenAudience},
    models::{NewUser, User, UserChanges, UserCreate, UserUpdate},
    password,
    repositories::UserRepository,
    validation::{normalize_email, validate_email, validate_password},
};

/// User manager
#[derive(Clone)]
pub struct UserManager {
    user_repository: UserRepository,
    jwt_service: JwtService,
}

impl UserManager {
    /// Create a new user manager
    pub fn new(user_repository: UserRepository, jwt_service: JwtService) -> Self {
        Self {
            user_repository,
            jwt_service,
        }
    }

    /// Register a new account
    pub async fn register(&self, payload: &UserCreate) -> Result<User, AuthError> {
        let email = normalize_email(&payload.email);
        validate_email(&email).map_err(AuthError::InvalidEmail)?;
        validate_password(&payload.password, &email).map_err(AuthError::InvalidPassword)?;

        let hashed_password = password::hash_password(&payload.password).await?;
        let user = self
            .user_repository
            .create(&NewUser {
                email,
                hashed_password,
            })
            .await?;

        info!("User {} has registered", user.id);
        Ok(user)
    }

    /// Get a user by ID
    pub async fn get(&self, id: Uuid) -> Result<User, AuthError> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update a user.
    ///
    /// With `safe` set only email and password may change; account flags are
    /// left untouched whatever the payload says. Changing the email resets the
    /// verified flag.
    pub async fn update(
        &self,
        user: &User,
        update: UserUpdate,
        safe: bool,
    ) -> Result<User, AuthError> {
        let mut changes = UserChanges::default();

        let email = match update.email {
            Some(email) => {
                let email = normalize_email(&email);
                validate_email(&email).map_err(AuthError::InvalidEmail)?;
                if email != user.email {
                    changes.email = Some(email.clone());
                    changes.is_verified = Some(false);
                }
                email
            }
            None => user.email.clone(),
        };

        if let Some(new_password) = update.password {
            validate_password(&new_password, &email).map_err(AuthError::InvalidPassword)?;
            changes.hashed_password = Some(password::hash_password(&new_password).await?);
        }

        if !safe {
            changes.is_active = update.is_active;
            changes.is_superuser = update.is_superuser;
            if update.is_verified.is_some() {
                changes.is_verified = update.is_verified;
            }
        }

        self.user_repository.update(user.id, &changes).await
    }

    /// Start a password reset.
    ///
    /// Unknown or inactive emails are silently ignored so the endpoint does not
    /// reveal which accounts exist.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);

        let Some(user) = self.user_repository.find_by_email(&email).await? else {
            return Ok(());
        };

        if !user.is_active {
            return Ok(());
        }

        let token = self.issue_reset_token(&user)?;
        self.on_after_forgot_password(&user, &token);
        Ok(())
    }

    /// Finish a password reset
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<User, AuthError> {
        let claims = self
            .jwt_service
            .validate_token(token, TokenAudience::ResetPassword)
            .map_err(|_| AuthError::BadToken)?;

        let user = self
            .user_repository
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::BadToken)?;

        if !user.is_active {
            return Err(AuthError::BadToken);
        }

        // The fingerprint moves on as soon as the password changes, which makes the token single-use
        let current = password::fingerprint(&user.hashed_password);
        if current.is_none() || claims.password_fgpt != current {
            return Err(AuthError::BadToken);
        }

        validate_password(new_password, &user.email).map_err(AuthError::InvalidPassword)?;

        let hashed_password = password::hash_password(new_password).await?;
        let user = self
            .user_repository
            .set_password(user.id, hashed_password)
            .await?;

        info!("User {} has reset their password", user.id);
        Ok(user)
    }

    /// Issue a verification token for an active, unverified account.
    ///
    /// Like [`forgot_password`](Self::forgot_password) this never reports
    /// whether the email is known.
    pub async fn request_verify(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);

        let Some(user) = self.user_repository.find_by_email(&email).await? else {
            return Ok(());
        };

        if !user.is_active || user.is_verified {
            return Ok(());
        }

        let token = self.jwt_service.generate_verify_token(&user)?;
        self.on_after_request_verify(&user, &token);
        Ok(())
    }

    /// Mark an account verified
    pub async fn verify(&self, token: &str) -> Result<User, AuthError> {
        let claims = self
            .jwt_service
            .validate_token(token, TokenAudience::Verify)
            .map_err(|_| AuthError::BadToken)?;

        let user = self
            .user_repository
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::BadToken)?;

        if claims.email.as_deref() != Some(user.email.as_str()) {
            return Err(AuthError::BadToken);
        }

        if user.is_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let user = self.user_repository.mark_verified(user.id).await?;

        info!("User {} has been verified", user.id);
        Ok(user)
    }

    pub(crate) fn issue_reset_token(&self, user: &User) -> Result<String, AuthError> {
        let fingerprint = password::fingerprint(&user.hashed_password)
            .ok_or_else(|| AuthError::Hashing("Stored password hash has no salt".to_string()))?;

        Ok(self.jwt_service.generate_reset_token(user, fingerprint)?)
    }

    // Token delivery hooks. There is no mail transport, so tokens only reach the log.

    fn on_after_forgot_password(&self, user: &User, token: &str) {
        info!("User {} has forgotten their password", user.id);
        debug!("Reset token for user {}: {}", user.id, token);
    }

    fn on_after_request_verify(&self, user: &User, token: &str) {
        info!("Verification requested for user {}", user.id);
        debug!("Verification token for user {}: {}", user.id, token);
    }
}

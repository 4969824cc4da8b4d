//! User repository for database operations

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::AuthError,
    models::{NewUser, User, UserChanges},
};

const USER_COLUMNS: &str =
    "id, email, hashed_password, is_active, is_superuser, is_verified, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. New accounts are active, unverified and not superusers.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, AuthError> {
        info!("Creating new user: {}", new_user.email);

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, hashed_password, is_active, is_superuser, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, TRUE, FALSE, FALSE, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.hashed_password)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Apply a partial update and return the stored row
    pub async fn update(&self, id: Uuid, changes: &UserChanges) -> Result<User, AuthError> {
        info!("Updating user: {}", id);

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE(?, email),
                hashed_password = COALESCE(?, hashed_password),
                is_active = COALESCE(?, is_active),
                is_superuser = COALESCE(?, is_superuser),
                is_verified = COALESCE(?, is_verified),
                updated_at = ?
            WHERE id = ?
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&changes.email)
        .bind(&changes.hashed_password)
        .bind(changes.is_active)
        .bind(changes.is_superuser)
        .bind(changes.is_verified)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_unique_violation)?
        .ok_or(AuthError::UserNotFound)?;

        tx.commit().await?;
        Ok(user)
    }

    /// Replace the stored password hash
    pub async fn set_password(&self, id: Uuid, hashed_password: String) -> Result<User, AuthError> {
        let changes = UserChanges {
            hashed_password: Some(hashed_password),
            ..Default::default()
        };
        self.update(id, &changes).await
    }

    pub async fn mark_verified(&self, id: Uuid) -> Result<User, AuthError> {
        let changes = UserChanges {
            is_verified: Some(true),
            ..Default::default()
        };
        self.update(id, &changes).await
    }
}

fn map_unique_violation(err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::DuplicateEmail,
        _ => AuthError::Database(err),
    }
}

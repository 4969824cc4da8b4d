//! Post repository: feed assembly and owner-checked deletion

use media::Post;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::FeedEntry;

/// How an owner-checked delete ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Forbidden,
}

/// Post repository for database operations
#[derive(Clone)]
pub struct PostRepository {
    pool: SqlitePool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every post, newest first, annotated for `viewer`
    pub async fn feed(&self, viewer: Uuid) -> Result<Vec<FeedEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.id AS id, p.user_id AS user_id, p.caption AS caption, p.url AS url,
                   p.file_type AS file_type, p.file_name AS file_name,
                   p.created_at AS created_at, COALESCE(u.email, 'unknown') AS email
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            ORDER BY p.created_at DESC, p.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let post = Post::from_row(row)?;
                let email: String = row.try_get("email")?;
                Ok::<_, sqlx::Error>(FeedEntry::new(post, email, viewer))
            })
            .collect()
    }

    /// Delete `post_id` if `requester` owns it.
    ///
    /// The `DELETE` is the first statement of the transaction so it takes the
    /// write lock up front; racing deletes of the same post queue on that lock
    /// and every loser then finds no row and reports `NotFound`.
    pub async fn delete_owned(
        &self,
        post_id: Uuid,
        requester: Uuid,
    ) -> Result<DeleteOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = ? AND user_id = ?")
            .bind(post_id)
            .bind(requester)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() > 0 {
            tx.commit().await?;
            info!("Deleted post {} for user {}", post_id, requester);
            return Ok(DeleteOutcome::Deleted);
        }

        // Nothing deleted: tell a missing post apart from someone else's
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT user_id FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?;

        match owner {
            None => Ok(DeleteOutcome::NotFound),
            Some(owner) => {
                warn!("User {} tried to delete post {} owned by {}", requester, post_id, owner);
                Ok(DeleteOutcome::Forbidden)
            }
        }
    }
}

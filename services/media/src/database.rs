use crate::models::{NewPost, Post};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a post; nothing is visible unless the whole write commits
    pub async fn insert_post(&self, post: &NewPost) -> Result<Post, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO posts (id, user_id, caption, url, file_type, file_name, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id, user_id, caption, url, file_type, file_name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(post.user_id)
        .bind(&post.caption)
        .bind(&post.url)
        .bind(post.file_type.as_str())
        .bind(&post.file_name)
        .bind(post.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let post = Post::from_row(&row)?;
        tx.commit().await?;

        Ok(post)
    }
}

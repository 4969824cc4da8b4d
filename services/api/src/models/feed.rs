//! Feed models

use chrono::{DateTime, Utc};
use media::{FileType, Post};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A post as seen by one viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: String,
    pub url: String,
    pub file_type: FileType,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    /// Whether the viewer owns this post
    pub is_owner: bool,
    /// Author email, `"unknown"` when the author no longer resolves
    pub email: String,
}

impl FeedEntry {
    pub fn new(post: Post, email: String, viewer: Uuid) -> Self {
        Self {
            is_owner: post.user_id == viewer,
            id: post.id,
            user_id: post.user_id,
            caption: post.caption,
            url: post.url,
            file_type: post.file_type,
            file_name: post.file_name,
            created_at: post.created_at,
            email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<FeedEntry>,
}

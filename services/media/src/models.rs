use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, sqlite::SqliteRow};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Kind of media behind a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
}

impl FileType {
    /// `video/*` is a video, anything else (including no type at all) an image
    pub fn from_mime(content_type: Option<&str>) -> Self {
        match content_type {
            Some(mime) if mime.trim().to_ascii_lowercase().starts_with("video/") => {
                FileType::Video
            }
            _ => FileType::Image,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "image",
            FileType::Video => "video",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(FileType::Image),
            "video" => Ok(FileType::Video),
            other => Err(format!("unknown file type `{}`", other)),
        }
    }
}

/// A published media post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub caption: String,
    pub url: String,
    pub file_type: FileType,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Map a `posts` row
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let file_type: String = row.try_get("file_type")?;
        let file_type = file_type
            .parse()
            .map_err(|e: String| sqlx::Error::ColumnDecode {
                index: "file_type".to_string(),
                source: e.into(),
            })?;

        Ok(Post {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            caption: row.try_get("caption")?,
            url: row.try_get("url")?,
            file_type,
            file_name: row.try_get("file_name")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Row to insert once the media host accepted the file
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub caption: String,
    pub url: String,
    pub file_type: FileType,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// What the media host reports back for a stored file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Storage id; a successful response without one is treated as a failed upload
    #[serde(default)]
    pub file_id: Option<String>,
    /// Canonical stored name, made unique by the host
    pub name: String,
    /// Public URL
    pub url: String,
}

/// Everything about an upload except the bytes
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub owner_id: Uuid,
    pub caption: String,
    pub file_name: String,
    pub content_type: Option<String>,
}

//! Upload pipeline: staged bytes in, persisted post out

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    database::Database,
    error::UploadError,
    host::MediaHost,
    models::{FileType, NewPost, Post, UploadRequest},
    staging::StagedFile,
};

#[derive(Clone)]
pub struct UploadGateway {
    host: Arc<dyn MediaHost>,
    database: Database,
}

impl UploadGateway {
    pub fn new(host: Arc<dyn MediaHost>, database: Database) -> Self {
        Self { host, database }
    }

    /// Push the staged file to the media host and record the post.
    ///
    /// The staged file is consumed and removed whatever the outcome. No post
    /// row exists unless the host returned a storage id.
    pub async fn upload(
        &self,
        mut staged: StagedFile,
        request: UploadRequest,
    ) -> Result<Post, UploadError> {
        staged.finish().await?;

        let stored = self
            .host
            .upload(&staged, &request.file_name)
            .await
            .inspect_err(|e| error!("Upload of {} failed: {}", request.file_name, e))?;

        if stored.file_id.as_deref().is_none_or(str::is_empty) {
            error!("Media host returned no file id for {}", request.file_name);
            return Err(UploadError::MissingFileId(request.file_name));
        }

        let new_post = NewPost {
            user_id: request.owner_id,
            caption: request.caption,
            url: stored.url,
            file_type: FileType::from_mime(request.content_type.as_deref()),
            file_name: stored.name,
            created_at: Utc::now(),
        };

        let post = self.database.insert_post(&new_post).await?;
        info!(
            "Published {} post {} for user {}",
            post.file_type, post.id, post.user_id
        );

        Ok(post)
    }
}

//! External media host client
//!
//! The gateway only depends on the [`MediaHost`] trait; [`ImageKitHost`] is
//! the production implementation speaking ImageKit's upload API.

use async_trait::async_trait;
use reqwest::{
    Body, Client,
    multipart::{Form, Part},
};
use std::{env, time::Duration};
use tracing::{debug, error, info};

use crate::{error::HostError, models::StoredFile, staging::StagedFile};

const DEFAULT_UPLOAD_URL: &str = "https://upload.imagekit.io/api/v1/files/upload";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Something that can durably store an uploaded file and hand back a public URL
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, file: &StagedFile, file_name: &str) -> Result<StoredFile, HostError>;
}

#[derive(Debug, Clone)]
pub struct MediaHostConfig {
    pub private_key: String,
    pub upload_url: String,
    pub timeout: Duration,
}

impl MediaHostConfig {
    pub fn from_env() -> Result<Self, HostError> {
        let private_key = env::var("IMAGEKIT_PRIVATE_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| HostError::Configuration("IMAGEKIT_PRIVATE_KEY must be set".into()))?;

        let upload_url =
            env::var("IMAGEKIT_UPLOAD_URL").unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string());

        let timeout_secs = env::var("IMAGEKIT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| HostError::Configuration(format!("Invalid IMAGEKIT_TIMEOUT_SECS: {}", e)))?;

        Ok(Self {
            private_key,
            upload_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

pub struct ImageKitHost {
    client: Client,
    config: MediaHostConfig,
}

impl ImageKitHost {
    pub fn new(config: MediaHostConfig) -> Result<Self, HostError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MediaHost for ImageKitHost {
    async fn upload(&self, file: &StagedFile, file_name: &str) -> Result<StoredFile, HostError> {
        debug!(
            "Uploading {} ({} bytes) to media host",
            file_name,
            file.size()
        );

        let staged = tokio::fs::File::open(file.path()).await?;
        let part = Part::stream_with_length(Body::from(staged), file.size())
            .file_name(file_name.to_string());
        let form = Form::new()
            .part("file", part)
            .text("fileName", file_name.to_string())
            .text("useUniqueFileName", "true")
            .text("tags", "backend-upload");

        let response = self
            .client
            .post(&self.config.upload_url)
            .basic_auth(&self.config.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Media host rejected {}: {} {}", file_name, status, message);
            return Err(HostError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let stored: StoredFile = response.json().await?;
        info!("Media host stored {} as {}", file_name, stored.name);
        Ok(stored)
    }
}

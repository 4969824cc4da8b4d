//! Errors raised while publishing media

use thiserror::Error;

/// Failure talking to the external media host
#[derive(Error, Debug)]
pub enum HostError {
    #[error("media host request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media host rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to read staged file: {0}")]
    Io(#[from] std::io::Error),

    #[error("media host configuration error: {0}")]
    Configuration(String),
}

/// Any failure along the upload pipeline. Callers surface all variants as a
/// single "upload failed" outcome carrying the cause.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("media host accepted `{0}` but returned no file id")]
    MissingFileId(String),

    #[error("failed to save post: {0}")]
    Persistence(#[from] sqlx::Error),
}

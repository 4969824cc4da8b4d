//! Media upload gateway
//!
//! Stages incoming files on disk, forwards them to the external media host
//! and records the resulting post.

pub mod database;
pub mod error;
pub mod gateway;
pub mod host;
pub mod models;
pub mod staging;

pub use database::Database;
pub use error::{HostError, UploadError};
pub use gateway::UploadGateway;
pub use host::{ImageKitHost, MediaHost, MediaHostConfig};
pub use models::{FileType, Post, StoredFile, UploadRequest};
pub use staging::StagedFile;

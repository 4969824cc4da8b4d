//! API models for request and response payloads

use serde::{Deserialize, Serialize};

pub mod feed;

pub use feed::{FeedEntry, FeedResponse};

/// Response for a post deletion
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Response for the health probe
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

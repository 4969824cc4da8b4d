//! FeedHub HTTP service
//!
//! Assembles the auth routes, the upload gateway and the post feed into one
//! axum application.

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;

//! Repositories for database operations

pub mod posts;

pub use posts::{DeleteOutcome, PostRepository};

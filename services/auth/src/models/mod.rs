//! Authentication service models

pub mod user;

// Re-export for convenience
pub use user::{LoginForm, NewUser, UserChanges, UserCreate, UserRead, UserUpdate, User};

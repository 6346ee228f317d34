//! Data models for the bookstore

pub mod book;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookChange, TrackedBook};
pub use user::{LoginRequest, RegisterRequest, TokenClaims, TokenResponse, User};

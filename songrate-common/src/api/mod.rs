//! API module for shared HTTP API functionality
//!
//! Provides credential handling and response types used by the SongRate
//! service.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Shared types
//!
//! The service wraps these with framework-specific middleware (Axum).

pub mod auth;
pub mod types;

pub use auth::{
    check_password_length, hash_password, hash_password_with_cost, verify_password, AuthError,
    Claims, TokenSigner, MAX_PASSWORD_BYTES,
};
pub use types::{ErrorResponse, Page, UserResponse};

//! # SongRate Common Library
//!
//! Shared code for the SongRate service including:
//! - Database initialization and row models
//! - Credential primitives (password hashing, signed tokens)
//! - API response types
//! - Configuration loading
//! - Duration parsing for human-written settings

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod human_time;

pub use error::{Error, Result};

//! HTTP API handlers for songrate-api

pub mod artists;
pub mod auth;
pub mod extract;
pub mod health;
pub mod ratings;
pub mod songs;
pub mod users;

pub use auth::{auth_middleware, AuthUser, ACCESS_TOKEN_HEADER, AUTH_TOKEN_HEADER};
pub use health::health_routes;

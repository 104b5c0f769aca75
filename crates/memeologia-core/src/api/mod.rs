//! HTTP client module for the Memeologia authentication endpoint.
//!
//! The endpoint accepts `{ "email", "contraseña" }` as JSON and answers
//! with `{ "token" }` on success or `{ "detail" }` on failure.

pub mod client;
pub mod error;

pub use client::{AuthClient, LoginRequest, DEFAULT_LOGIN_URL};
pub use error::LoginError;

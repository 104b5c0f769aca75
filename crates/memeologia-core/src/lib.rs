//! Core library for the Memeologia client.
//!
//! - `api`: HTTP client for the authentication endpoint and its error type
//! - `auth`: the session store seam and the file-backed session
//! - `login`: login view state machine (credentials, flags, submission)
//! - `navigation`: the navigator seam and route parsing
//! - `config`: persisted client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod login;
pub mod navigation;

pub use api::{AuthClient, LoginError, LoginRequest};
pub use auth::{Session, SessionData, SessionStore};
pub use config::Config;
pub use login::{Credentials, LoginForm, LoginView, ViewState};
pub use navigation::{Navigator, Route, Router};

//! Authentication module for holding the session token.
//!
//! This module provides:
//! - `SessionStore`: the capability the login view hands a token to
//! - `Session`: a file-backed store that keeps the token across runs

pub mod session;

pub use session::{Session, SessionData, SessionStore};

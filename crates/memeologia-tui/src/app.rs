//! Application state management for the Memeologia terminal client.
//!
//! This module contains the `App` struct that owns the session, the router,
//! the login view and the channel that brings login results back from the
//! background task.

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use memeologia_core::api::LoginError;
use memeologia_core::navigation::{LOGIN_PATH, REGISTER_PATH};
use memeologia_core::{AuthClient, Config, LoginView, Navigator, Route, Router, Session};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// Only one login is ever in flight, so a small buffer is plenty.
const CHANNEL_BUFFER_SIZE: usize = 4;

// ============================================================================
// State Enums
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Visibility,
    Button,
    Register,
}

impl LoginFocus {
    pub fn next(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Visibility,
            LoginFocus::Visibility => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Register,
            LoginFocus::Register => LoginFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Register,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Visibility => LoginFocus::Password,
            LoginFocus::Button => LoginFocus::Visibility,
            LoginFocus::Register => LoginFocus::Button,
        }
    }
}

/// Results delivered from background tasks to the UI loop.
enum BackgroundResult {
    /// Outcome of the login request started by `submit_login`
    Login(Result<String, LoginError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    config_path: PathBuf,
    pub session: Session,
    pub api: AuthClient,
    pub router: Router,

    // UI State
    pub state: AppState,
    pub login: LoginView,
    pub login_focus: LoginFocus,
    pub status_message: Option<String>,

    background_rx: mpsc::Receiver<BackgroundResult>,
    background_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create the app from a loaded config and the stored session
    pub fn new(config: Config, config_path: PathBuf) -> Result<Self> {
        let cache_dir = config.cache_dir()?;
        debug!(?cache_dir, "Cache directory configured");
        let session = load_session(cache_dir);

        let api = AuthClient::new(config.login_url(), config.request_timeout())?;
        Ok(Self::with_parts(config, config_path, session, api))
    }

    /// Assemble the app from already-built services
    pub fn with_parts(config: Config, config_path: PathBuf, session: Session, api: AuthClient) -> Self {
        let mut login = LoginView::new(config.initial_email());
        login.credentials.password = Config::initial_password();

        let initial = if session.is_authenticated() {
            Route::Home
        } else {
            Route::Login
        };

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let mut app = Self {
            config,
            config_path,
            session,
            api,
            router: Router::new(initial),

            state: AppState::Normal,
            login,
            login_focus: LoginFocus::Email,
            status_message: None,

            background_rx: rx,
            background_tx: tx,
        };
        app.login_focus = app.initial_login_focus();
        app
    }

    pub fn route(&self) -> &Route {
        self.router.current()
    }

    fn initial_login_focus(&self) -> LoginFocus {
        if self.login.credentials.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Show the login screen
    pub fn start_login(&mut self) {
        if self.router.current() != &Route::Login {
            self.router.push(LOGIN_PATH);
        }
        self.login_focus = self.initial_login_focus();
    }

    /// Start a login request in the background.
    ///
    /// Does nothing while a request is already outstanding.
    pub fn submit_login(&mut self) {
        let Some(request) = self.login.begin_submit() else {
            return;
        };

        let api = self.api.clone();
        let tx = self.background_tx.clone();
        tokio::spawn(async move {
            let result = api.authenticate(&request).await;
            if tx.send(BackgroundResult::Login(result)).await.is_err() {
                warn!("Login finished after the app shut down");
            }
        });
    }

    /// Follow the sign-up link below the login form
    pub fn open_register(&mut self) {
        self.router.push(REGISTER_PATH);
    }

    /// Drop the stored token and go back to the login screen
    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to remove session file");
        }
        info!("Logged out");
        self.status_message = Some("Sesión cerrada".to_string());
        self.start_login();
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Apply any results that background tasks have sent
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.background_rx.try_recv() {
            self.process_background_result(result);
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Login(result) => {
                let email = self.login.credentials.email.clone();
                let succeeded = self
                    .login
                    .finish_submit(result, &mut self.session, &mut self.router);

                if succeeded {
                    self.config.last_email = Some(email);
                    if let Err(e) = self.config.save_to(&self.config_path) {
                        warn!(error = %e, "Failed to save config");
                    }
                    self.status_message = Some("Sesión iniciada".to_string());
                }
            }
        }
    }
}

/// Load the stored session, starting signed out if the file is unreadable
fn load_session(cache_dir: PathBuf) -> Session {
    let mut session = Session::new(cache_dir);
    if let Err(e) = session.load() {
        warn!(error = %e, "Ignoring unreadable session file");
    }
    session
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters).
/// Field contents are otherwise passed through as typed.
pub fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================

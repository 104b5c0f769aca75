//! Login view state.
//!
//! `LoginView` owns the credentials being typed and the form flags, and
//! runs one submission at a time:
//!
//! ```text
//! Idle --begin_submit--> Submitting --finish_submit--> Idle
//! ```
//!
//! A submission is split in two so a UI loop can keep drawing while the
//! request is pending: `begin_submit` hands out the request, the caller
//! runs it wherever it likes, and `finish_submit` applies the outcome.
//! `submit` does both in one await for callers that can block.

use std::borrow::Cow;
use std::fmt;

use tracing::{debug, error, info, warn};

use crate::api::{AuthClient, LoginError, LoginRequest};
use crate::auth::SessionStore;
use crate::navigation::{Navigator, ROOT_PATH};

/// Shown when submit is attempted with an empty field
pub const MISSING_FIELDS_MESSAGE: &str = "Completa el correo y la contraseña";

/// Submit control label while idle
pub const SUBMIT_LABEL: &str = "Iniciar Sesión";

/// Submit control label while a request is pending
pub const SUBMITTING_LABEL: &str = "Cargando...";

/// Character used to mask the password
const MASK_CHAR: char = '*';

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub password_visible: bool,
    pub error_message: Option<String>,
    pub is_submitting: bool,
}

/// What the form should display, derived from the view.
#[derive(Debug, PartialEq, Eq)]
pub struct LoginForm<'a> {
    pub email: &'a str,
    /// Password text as displayed: masked unless visibility is on
    pub password: Cow<'a, str>,
    pub password_visible: bool,
    pub submit_label: &'static str,
    pub submit_enabled: bool,
    pub error: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct LoginView {
    pub credentials: Credentials,
    state: ViewState,
}

impl LoginView {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                email: email.into(),
                password: String::new(),
            },
            state: ViewState::default(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state.is_submitting
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    pub fn password_visible(&self) -> bool {
        self.state.password_visible
    }

    /// Flip password masking. The stored password is untouched.
    pub fn toggle_password_visibility(&mut self) {
        self.state.password_visible = !self.state.password_visible;
    }

    /// Derive what the form shows right now.
    pub fn render_form(&self) -> LoginForm<'_> {
        let password = if self.state.password_visible {
            Cow::Borrowed(self.credentials.password.as_str())
        } else {
            Cow::Owned(
                std::iter::repeat(MASK_CHAR)
                    .take(self.credentials.password.chars().count())
                    .collect(),
            )
        };

        LoginForm {
            email: &self.credentials.email,
            password,
            password_visible: self.state.password_visible,
            submit_label: if self.state.is_submitting {
                SUBMITTING_LABEL
            } else {
                SUBMIT_LABEL
            },
            submit_enabled: !self.state.is_submitting,
            error: self.state.error_message.as_deref(),
        }
    }

    /// Enter the Submitting state and hand out the request to send.
    ///
    /// Returns `None` without touching any state while a submission is
    /// already outstanding. Returns `None` and sets the error message when
    /// a field is empty.
    pub fn begin_submit(&mut self) -> Option<LoginRequest> {
        if self.state.is_submitting {
            debug!("Login already in flight, ignoring submit");
            return None;
        }

        if self.credentials.email.is_empty() || self.credentials.password.is_empty() {
            self.state.error_message = Some(MISSING_FIELDS_MESSAGE.to_string());
            return None;
        }

        self.state.error_message = None;
        self.state.is_submitting = true;

        Some(LoginRequest {
            email: self.credentials.email.clone(),
            password: self.credentials.password.clone(),
        })
    }

    /// Apply the outcome of the request handed out by `begin_submit`.
    ///
    /// On success the token goes to `session`, the navigator is sent to the
    /// root route and the typed password is dropped. On failure the error
    /// message is set; credentials stay as typed. Either way the view is
    /// back to Idle. Returns whether the login succeeded.
    pub fn finish_submit<S, N>(
        &mut self,
        result: Result<String, LoginError>,
        session: &mut S,
        navigator: &mut N,
    ) -> bool
    where
        S: SessionStore + ?Sized,
        N: Navigator + ?Sized,
    {
        self.state.is_submitting = false;

        match result {
            Ok(token) => {
                session.login(token);
                navigator.push(ROOT_PATH);
                self.credentials.password.clear();
                self.state.error_message = None;
                info!(email = %self.credentials.email, "Login successful");
                true
            }
            Err(e) => {
                match &e {
                    LoginError::Transport(_) => error!(error = %e, "Login request failed"),
                    _ => warn!(error = %e, "Login rejected"),
                }
                self.state.error_message = Some(e.user_message());
                false
            }
        }
    }

    /// Run a whole submission against `client`.
    pub async fn submit<S, N>(
        &mut self,
        client: &AuthClient,
        session: &mut S,
        navigator: &mut N,
    ) -> bool
    where
        S: SessionStore + ?Sized,
        N: Navigator + ?Sized,
    {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let result = client.authenticate(&request).await;
        self.finish_submit(result, session, navigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{
        CONNECTION_FAILURE_MESSAGE, GENERIC_FAILURE_MESSAGE, UNAUTHORIZED_MESSAGE,
    };
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    // -------------------------------------------------------------------------
    // Collaborator doubles
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingStore {
        tokens: Vec<String>,
    }

    impl SessionStore for RecordingStore {
        fn login(&mut self, token: String) {
            self.tokens.push(token);
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        paths: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
        fn push(&mut self, path: &str) {
            self.paths.push(path.to_string());
        }
    }

    fn filled_view() -> LoginView {
        let mut view = LoginView::new("ana@example.com");
        view.credentials.password = "hunter2".to_string();
        view
    }

    // -------------------------------------------------------------------------
    // Canned HTTP server
    // -------------------------------------------------------------------------

    /// Accept one connection, answer it with `status` and `body`, and
    /// return the raw request text through the join handle.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{}/login", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let content_length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/login", addr)
    }

    /// Drive one submission step by step, checking the flag at each step.
    async fn run_submission(
        view: &mut LoginView,
        url: &str,
        store: &mut RecordingStore,
        nav: &mut RecordingNavigator,
    ) -> bool {
        let client = AuthClient::new(url, None).unwrap();
        assert!(!view.is_submitting());

        let request = view.begin_submit().expect("submission should start");
        assert!(view.is_submitting());

        let result = client.authenticate(&request).await;
        assert!(view.is_submitting());

        let ok = view.finish_submit(result, store, nav);
        assert!(!view.is_submitting());
        ok
    }

    // -------------------------------------------------------------------------
    // Submission outcomes
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_success_stores_token_and_navigates_home() {
        let (url, server) = serve_once("200 OK", r#"{"token":"abc"}"#).await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(run_submission(&mut view, &url, &mut store, &mut nav).await);

        assert_eq!(store.tokens, vec!["abc".to_string()]);
        assert_eq!(nav.paths, vec!["/".to_string()]);
        assert_eq!(view.error_message(), None);
        assert!(view.credentials.password.is_empty());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /login "));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        assert!(request.contains(r#""email":"ana@example.com""#));
        assert!(request.contains(r#""contraseña":"hunter2""#));
    }

    #[tokio::test]
    async fn test_unauthorized_shows_fixed_message() {
        let (url, _server) =
            serve_once("401 Unauthorized", r#"{"detail":"Credenciales inválidas"}"#).await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(!run_submission(&mut view, &url, &mut store, &mut nav).await);

        assert_eq!(view.error_message(), Some(UNAUTHORIZED_MESSAGE));
        assert!(store.tokens.is_empty());
        assert!(nav.paths.is_empty());
        // Credentials are kept for another try
        assert_eq!(view.credentials.password, "hunter2");
    }

    #[tokio::test]
    async fn test_unauthorized_with_non_json_body() {
        let (url, _server) = serve_once("401 Unauthorized", "nope").await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        run_submission(&mut view, &url, &mut store, &mut nav).await;
        assert_eq!(view.error_message(), Some("Usuario y/o contraseña incorrecta"));
    }

    #[tokio::test]
    async fn test_server_error_shows_detail() {
        let (url, _server) = serve_once("500 Internal Server Error", r#"{"detail":"db down"}"#).await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(!run_submission(&mut view, &url, &mut store, &mut nav).await);
        assert_eq!(view.error_message(), Some("db down"));
    }

    #[tokio::test]
    async fn test_server_error_without_detail_shows_fallback() {
        let (url, _server) = serve_once("500 Internal Server Error", "{}").await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(!run_submission(&mut view, &url, &mut store, &mut nav).await);
        assert_eq!(view.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_non_json_error_body_shows_fallback() {
        let (url, _server) = serve_once("502 Bad Gateway", "<html>bad gateway</html>").await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(!run_submission(&mut view, &url, &mut store, &mut nav).await);
        assert_eq!(view.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_success_without_token_is_not_a_login() {
        let (url, _server) = serve_once("200 OK", r#"{"mensaje":"ok"}"#).await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(!run_submission(&mut view, &url, &mut store, &mut nav).await);
        assert!(store.tokens.is_empty());
        assert!(nav.paths.is_empty());
        assert_eq!(view.error_message(), Some(GENERIC_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_connection_refused_shows_connection_message() {
        let url = closed_port_url().await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(!run_submission(&mut view, &url, &mut store, &mut nav).await);
        assert_eq!(view.error_message(), Some(CONNECTION_FAILURE_MESSAGE));
        assert!(!view.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_runs_whole_flow() {
        let (url, _server) = serve_once("200 OK", r#"{"token":"abc"}"#).await;
        let client = AuthClient::new(url, None).unwrap();
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();

        assert!(view.submit(&client, &mut store, &mut nav).await);
        assert!(!view.is_submitting());
        assert_eq!(store.tokens, vec!["abc".to_string()]);
        assert_eq!(nav.paths, vec!["/".to_string()]);
    }

    #[tokio::test]
    async fn test_new_submission_clears_previous_error() {
        let url = closed_port_url().await;
        let mut view = filled_view();
        let mut store = RecordingStore::default();
        let mut nav = RecordingNavigator::default();
        run_submission(&mut view, &url, &mut store, &mut nav).await;
        assert!(view.error_message().is_some());

        view.begin_submit().expect("submission should start");
        assert_eq!(view.error_message(), None);
    }

    // -------------------------------------------------------------------------
    // Local state
    // -------------------------------------------------------------------------

    #[test]
    fn test_second_submit_rejected_while_in_flight() {
        let mut view = filled_view();
        assert!(view.begin_submit().is_some());
        assert!(view.begin_submit().is_none());
        assert!(view.is_submitting());
        assert_eq!(view.error_message(), None);
    }

    #[test]
    fn test_submit_requires_both_fields() {
        let mut view = LoginView::new("");
        view.credentials.password = "hunter2".to_string();
        assert!(view.begin_submit().is_none());
        assert!(!view.is_submitting());
        assert_eq!(view.error_message(), Some(MISSING_FIELDS_MESSAGE));

        let mut view = LoginView::new("ana@example.com");
        assert!(view.begin_submit().is_none());
        assert_eq!(view.error_message(), Some(MISSING_FIELDS_MESSAGE));
    }

    #[test]
    fn test_toggle_twice_restores_masking() {
        let mut view = filled_view();
        assert!(!view.password_visible());
        assert_eq!(view.render_form().password, "*******");

        view.toggle_password_visibility();
        assert!(view.password_visible());
        assert_eq!(view.render_form().password, "hunter2");

        view.toggle_password_visibility();
        assert!(!view.password_visible());
        assert_eq!(view.render_form().password, "*******");
        assert_eq!(view.credentials.password, "hunter2");
    }

    #[test]
    fn test_mask_counts_characters_not_bytes() {
        let mut view = LoginView::new("ana@example.com");
        view.credentials.password = "contraseña".to_string();
        assert_eq!(view.render_form().password.chars().count(), 10);
    }

    #[test]
    fn test_render_form_while_submitting() {
        let mut view = filled_view();
        let form = view.render_form();
        assert_eq!(form.submit_label, SUBMIT_LABEL);
        assert!(form.submit_enabled);

        view.begin_submit();
        let form = view.render_form();
        assert_eq!(form.submit_label, "Cargando...");
        assert!(!form.submit_enabled);
        assert_eq!(form.email, "ana@example.com");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let view = filled_view();
        let debug = format!("{:?}", view.credentials);
        assert!(!debug.contains("hunter2"));
    }
}

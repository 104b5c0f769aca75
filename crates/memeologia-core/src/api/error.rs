use serde_json::Value;
use thiserror::Error;

/// Shown for HTTP 401, whatever the body says.
pub const UNAUTHORIZED_MESSAGE: &str = "Usuario y/o contraseña incorrecta";

/// Shown when the server fails without a usable `detail`.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error desconocido en el inicio de sesión";

/// Shown when the request never completed.
pub const CONNECTION_FAILURE_MESSAGE: &str = "Error de conexión al servidor";

/// Maximum length for response bodies kept in error values
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Unauthorized - incorrect email or password")]
    Unauthorized,

    #[error("Server error (status {status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Server { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    MalformedResponse(String),
}

impl LoginError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
            None => body.to_string(),
            Some((cut, _)) => format!(
                "{}... (truncated, {} total bytes)",
                &body[..cut],
                body.len()
            ),
        }
    }

    /// Classify a non-success response.
    ///
    /// 401 never looks at the body. Any other status expects a JSON body
    /// and takes its `detail` string when there is a non-empty one; a body
    /// that is not JSON at all becomes `MalformedResponse`.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return LoginError::Unauthorized;
        }

        match serde_json::from_str::<Value>(body) {
            Ok(payload) => LoginError::Server {
                status: status.as_u16(),
                detail: Self::detail_of(&payload),
            },
            Err(e) => LoginError::MalformedResponse(format!(
                "status {} with non-JSON body ({}): {}",
                status,
                e,
                Self::truncate_body(body)
            )),
        }
    }

    fn detail_of(payload: &Value) -> Option<String> {
        payload
            .get("detail")
            .and_then(Value::as_str)
            .filter(|detail| !detail.is_empty())
            .map(str::to_string)
    }

    /// The single message the login form displays for this failure.
    pub fn user_message(&self) -> String {
        match self {
            LoginError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            LoginError::Server {
                detail: Some(detail),
                ..
            } => detail.clone(),
            LoginError::Server { detail: None, .. } | LoginError::MalformedResponse(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            LoginError::Transport(_) => CONNECTION_FAILURE_MESSAGE.to_string(),
        }
    }
}

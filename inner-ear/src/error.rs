use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Reserved error value telling clients to ask for a new API key.
pub const AUTH_ERROR_SENTINEL: &str = "AUTH_ERROR";

pub const MISSING_API_KEY_MESSAGE: &str = "API Key is required";

#[derive(Error, Debug)]
pub enum InnerEarError {
    #[error("API Key is required")]
    MissingCredential,

    #[error("Invalid API key: {0}")]
    InvalidCredential(String),

    #[error("API key permission denied: {0}")]
    PermissionDenied(String),

    #[error("Connection to the Gemini API failed: {0}")]
    Connectivity(String),

    #[error("{0}")]
    Provider(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl InnerEarError {
    /// True when the provider refused the credential itself, as opposed to
    /// failing for some other reason.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            InnerEarError::InvalidCredential(_) | InnerEarError::PermissionDenied(_)
        )
    }
}

/// Chat relay wire contract: every failure is a flat `{"error": "..."}` body.
impl IntoResponse for InnerEarError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            InnerEarError::MissingCredential => {
                (StatusCode::UNAUTHORIZED, MISSING_API_KEY_MESSAGE.to_string())
            }
            InnerEarError::InvalidCredential(_) | InnerEarError::PermissionDenied(_) => {
                (StatusCode::UNAUTHORIZED, AUTH_ERROR_SENTINEL.to_string())
            }
            InnerEarError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            InnerEarError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            InnerEarError::Connectivity(_) | InnerEarError::Provider(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            InnerEarError::Io(_) | InnerEarError::Internal(_) => {
                tracing::error!(error = %self, "Internal error mapped to response");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, InnerEarError>;

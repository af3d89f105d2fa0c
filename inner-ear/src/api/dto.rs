//! Request and response bodies for the relay endpoints.
//!
//! Field names are camelCase on the wire to match the browser client.

use serde::{Deserialize, Serialize};

use crate::models::Message;

/// Request body for `POST /api/validate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    /// Gemini API key to probe.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Response body for `POST /api/validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
    /// Classified reason when `valid` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    /// Full transcript, oldest first. Its last entry is the message being
    /// sent and is not replayed as context.
    #[serde(default)]
    pub history: Option<Vec<Message>>,
    /// The new user utterance.
    #[serde(default)]
    pub message: String,
    /// Persona instruction. The server default applies when absent or blank.
    #[serde(default)]
    pub system_instruction: Option<String>,
}

/// Successful response body for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ChatResponse {
    pub text: String,
}

/// Failure body for `POST /api/chat`. `AUTH_ERROR` means the key must be
/// re-entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

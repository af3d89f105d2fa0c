//! Upstream failure capture and classification.
//!
//! Google's APIs report failures as
//! `{"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT",
//! "details": [{"@type": "...ErrorInfo", "reason": "API_KEY_INVALID"}]}}`.
//! Classification reads those structured fields first and only falls back to
//! matching the message text when none of them decide the case.

use std::fmt;

use serde::Deserialize;

use crate::error::InnerEarError;

/// How a failed upstream call should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidCredential,
    PermissionDenied,
    Connectivity,
    Provider,
}

/// A failed call to the generative-language API.
#[derive(Debug, Clone)]
pub struct GeminiError {
    /// HTTP status, absent when the request never got a response.
    pub status: Option<u16>,
    /// Canonical RPC status name such as `INVALID_ARGUMENT`.
    pub api_status: Option<String>,
    /// `ErrorInfo.reason` values from the error details.
    pub reasons: Vec<String>,
    pub message: String,
    pub timed_out: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

impl GeminiError {
    /// Build from a non-success HTTP response body. Bodies that are not a
    /// Google error envelope are kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status: Some(status),
                api_status: envelope.error.status,
                reasons: envelope
                    .error
                    .details
                    .into_iter()
                    .filter_map(|detail| detail.reason)
                    .collect(),
                message: if envelope.error.message.is_empty() {
                    format!("Gemini API returned status {status}")
                } else {
                    envelope.error.message
                },
                timed_out: false,
            },
            Err(_) => Self {
                status: Some(status),
                api_status: None,
                reasons: Vec::new(),
                message: if body.trim().is_empty() {
                    format!("Gemini API returned status {status}")
                } else {
                    body.trim().to_string()
                },
                timed_out: false,
            },
        }
    }

    /// Build from a transport failure. The URL is stripped from the message.
    pub fn transport(error: reqwest::Error) -> Self {
        let timed_out = error.is_timeout();
        let status = error.status().map(|status| status.as_u16());
        Self {
            status,
            api_status: None,
            reasons: Vec::new(),
            message: error.without_url().to_string(),
            timed_out,
        }
    }

    /// A successful HTTP exchange whose payload could not be used.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self {
            status: None,
            api_status: None,
            reasons: Vec::new(),
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn classify(&self) -> ErrorClass {
        for reason in &self.reasons {
            if reason.starts_with("API_KEY_") {
                return if reason.ends_with("_BLOCKED") {
                    ErrorClass::PermissionDenied
                } else {
                    ErrorClass::InvalidCredential
                };
            }
        }

        match self.api_status.as_deref() {
            Some("UNAUTHENTICATED") => return ErrorClass::InvalidCredential,
            Some("PERMISSION_DENIED") => return ErrorClass::PermissionDenied,
            _ => {}
        }

        // A 400 with a canonical status already had its chance above; only
        // an unstructured 400 is assumed to be about the key.
        match self.status {
            Some(400) if self.api_status.is_none() => return ErrorClass::InvalidCredential,
            Some(401) => return ErrorClass::InvalidCredential,
            Some(403) => return ErrorClass::PermissionDenied,
            _ => {}
        }

        if self.message.to_lowercase().contains("api key") {
            return ErrorClass::InvalidCredential;
        }

        if self.timed_out || (self.status.is_none() && self.api_status.is_none()) {
            ErrorClass::Connectivity
        } else {
            ErrorClass::Provider
        }
    }
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Gemini API error (status {status}): {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for GeminiError {}

impl From<GeminiError> for InnerEarError {
    fn from(error: GeminiError) -> Self {
        match error.classify() {
            ErrorClass::InvalidCredential => InnerEarError::InvalidCredential(error.message),
            ErrorClass::PermissionDenied => InnerEarError::PermissionDenied(error.message),
            ErrorClass::Connectivity => InnerEarError::Connectivity(error.message),
            ErrorClass::Provider => InnerEarError::Provider(error.message),
        }
    }
}

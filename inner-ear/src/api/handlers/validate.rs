//! Key Validator endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::dto::{ValidateRequest, ValidateResponse};
use crate::api::extractors::AppJson;
use crate::api::AppState;
use crate::error::{InnerEarError, Result, MISSING_API_KEY_MESSAGE};
use crate::models::ApiKey;

pub const INVALID_KEY_MESSAGE: &str = "Invalid API Key";
pub const PERMISSION_DENIED_MESSAGE: &str =
    "API Key is not permitted to call the Gemini API (check referrer/IP restrictions)";
pub const CONNECTION_FAILED_MESSAGE: &str = "Could not connect to the Gemini API";

/// `POST /api/validate`
///
/// Probes the key with one minimal generation request. Nothing is stored.
#[utoipa::path(
    post,
    path = "/api/validate",
    tag = "relay",
    request_body = ValidateRequest,
    responses(
        (status = 200, description = "Key accepted by the provider", body = ValidateResponse),
        (status = 400, description = "Key missing or body malformed", body = ValidateResponse),
        (status = 401, description = "Key rejected by the provider", body = ValidateResponse),
        (status = 502, description = "Provider unreachable", body = ValidateResponse),
    )
)]
pub async fn validate_key(
    State(state): State<AppState>,
    payload: std::result::Result<AppJson<ValidateRequest>, InnerEarError>,
) -> (StatusCode, Json<ValidateResponse>) {
    match probe(&state, payload).await {
        Ok(()) => (StatusCode::OK, Json(ValidateResponse::valid())),
        Err(error) => {
            let (status, message) = classify_failure(&error);
            (status, Json(ValidateResponse::invalid(message)))
        }
    }
}

async fn probe(
    state: &AppState,
    payload: std::result::Result<AppJson<ValidateRequest>, InnerEarError>,
) -> Result<()> {
    let AppJson(req) = payload?;
    let api_key = ApiKey::from_request(req.api_key.as_deref())?;
    state.llm.validate_key(&api_key).await
}

/// Map a failed probe to the user-facing message and status.
fn classify_failure(error: &InnerEarError) -> (StatusCode, String) {
    match error {
        InnerEarError::MissingCredential => {
            (StatusCode::BAD_REQUEST, MISSING_API_KEY_MESSAGE.to_string())
        }
        InnerEarError::InvalidCredential(_) => {
            (StatusCode::UNAUTHORIZED, INVALID_KEY_MESSAGE.to_string())
        }
        InnerEarError::PermissionDenied(_) => {
            (StatusCode::UNAUTHORIZED, PERMISSION_DENIED_MESSAGE.to_string())
        }
        InnerEarError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        InnerEarError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
        InnerEarError::Connectivity(_) | InnerEarError::Provider(_) => {
            (StatusCode::BAD_GATEWAY, CONNECTION_FAILED_MESSAGE.to_string())
        }
        InnerEarError::Io(_) | InnerEarError::Internal(_) => {
            tracing::error!(error = %error, "Internal error during key validation");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            )
        }
    }
}

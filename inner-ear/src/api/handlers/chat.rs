//! Chat Relay endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::dto::{ChatRequest, ChatResponse, ErrorResponse};
use crate::api::extractors::AppJson;
use crate::api::AppState;
use crate::error::Result;
use crate::models::ApiKey;

/// `POST /api/chat`
///
/// Relays one turn. The transcript is resent in full by the client; its last
/// entry is the message itself and is not replayed as context.
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "relay",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Generated reply", body = ChatResponse),
        (status = 400, description = "Malformed body or blank message", body = ErrorResponse),
        (status = 401, description = "Key missing (`API Key is required`) or rejected (`AUTH_ERROR`)", body = ErrorResponse),
        (status = 500, description = "Provider or connection failure", body = ErrorResponse),
    )
)]
pub async fn chat(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let api_key = ApiKey::from_request(req.api_key.as_deref())?;
    let history = req.history.unwrap_or_default();

    let persona = req
        .system_instruction
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(&*state.persona);

    let text = state
        .llm
        .chat(&api_key, &history, &req.message, persona)
        .await?;

    Ok(Json(ChatResponse { text }))
}

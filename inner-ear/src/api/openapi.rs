use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "The Inner Ear API",
        version = "0.1.0",
        description = "Jazz mentor chat relay in front of the Gemini API. Callers bring their own API key with every request.",
    ),
    paths(
        handlers::health::health_check,
        handlers::validate::validate_key,
        handlers::chat::chat,
    ),
    components(schemas(
        dto::ValidateRequest,
        dto::ValidateResponse,
        dto::ChatRequest,
        dto::ChatResponse,
        dto::ErrorResponse,
        crate::models::Message,
        crate::models::Role,
        handlers::health::HealthData,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "relay", description = "Key validation and chat relay"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::dto::ErrorResponse;
use super::frontend;
use super::handlers;
use super::openapi;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/validate", post(handlers::validate_key))
        .route("/chat", post(handlers::chat))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router())
        .fallback(api_not_found)
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes));

    Router::new()
        .nest("/api", api)
        .fallback(frontend::serve_frontend)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn api_not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not Found".to_string(),
        }),
    )
}

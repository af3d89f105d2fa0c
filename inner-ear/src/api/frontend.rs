use std::path::Path;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use super::AppState;

/// Router fallback: serve the built single-page app from `STATIC_DIR`.
pub async fn serve_frontend(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::NOT_FOUND.into_response();
    }
    serve_asset_path(&state.config.server.static_dir, uri.path()).await
}

async fn serve_asset_path(root: &Path, path: &str) -> Response {
    let requested = path.trim_start_matches('/');
    let target = if requested.is_empty() {
        "index.html"
    } else {
        requested
    };

    if target.contains("..") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    // Unknown API routes must not turn into the app shell.
    if target == "api" || target.starts_with("api/") {
        return StatusCode::NOT_FOUND.into_response();
    }

    if let Some(response) = response_for_file(root, target).await {
        return response;
    }

    // Client-side routes have no extension.
    if !target.contains('.') {
        if let Some(response) = response_for_file(root, "index.html").await {
            return response;
        }
    }

    StatusCode::NOT_FOUND.into_response()
}

async fn response_for_file(root: &Path, path: &str) -> Option<Response> {
    let full_path = root.join(path);
    let metadata = tokio::fs::metadata(&full_path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }

    let data = match tokio::fs::read(&full_path).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(path = %full_path.display(), error = %e, "Failed to read static file");
            return None;
        }
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    let mut response = Response::new(Body::from(data));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref()).ok()?,
    );
    Some(response)
}

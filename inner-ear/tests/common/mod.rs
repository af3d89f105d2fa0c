#![allow(dead_code)]

use std::path::Path;
use std::sync::Once;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};

use inner_ear::api::{create_router, AppState};
use inner_ear::config::{
    ClientConfig, Config, GeminiConfig, ServerConfig, DEFAULT_MAX_BODY_BYTES,
};

pub const TEST_API_KEY: &str = "AIza-test-key";
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn gemini_config(base_url: &str) -> GeminiConfig {
    GeminiConfig {
        base_url: base_url.to_string(),
        model: "gemini-2.5-flash".to_string(),
        timeout_secs: 5,
    }
}

pub fn test_config(gemini_url: &str, static_dir: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: static_dir.to_path_buf(),
            persona_file: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        },
        gemini: gemini_config(gemini_url),
        client: ClientConfig {
            server_url: "http://localhost:3000".to_string(),
            key_file: ".inner_ear_api_key".into(),
        },
    }
}

/// Router wired to a stand-in Gemini at `gemini_url`.
pub fn test_app(gemini_url: &str, static_dir: &Path) -> Router {
    test_app_with_config(test_config(gemini_url, static_dir))
}

pub fn test_app_with_config(config: Config) -> Router {
    init_test_logger();
    let state = AppState::from_config(config).expect("app state");
    create_router(state)
}

/// Serve the router on an ephemeral port and return its base URL.
pub async fn spawn_app(gemini_url: &str, static_dir: &Path) -> String {
    let app = test_app(gemini_url, static_dir);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// A successful `generateContent` response carrying `text`.
pub fn text_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
    })
}

/// Google's error envelope.
pub fn error_body(code: u16, status: &str, message: &str, reason: Option<&str>) -> Value {
    let details = match reason {
        Some(reason) => json!([{
            "@type": "type.googleapis.com/google.rpc.ErrorInfo",
            "reason": reason,
            "domain": "googleapis.com"
        }]),
        None => json!([]),
    };
    json!({
        "error": {
            "code": code,
            "message": message,
            "status": status,
            "details": details
        }
    })
}

pub fn invalid_key_body() -> Value {
    error_body(
        400,
        "INVALID_ARGUMENT",
        "API key not valid. Please pass a valid API key.",
        Some("API_KEY_INVALID"),
    )
}

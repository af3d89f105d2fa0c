use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::dto::{ChatRequest, ChatResponse, ErrorResponse, ValidateRequest, ValidateResponse};
use crate::error::AUTH_ERROR_SENTINEL;
use crate::models::Message;

/// Upper bound on one relay round trip, covering the upstream generation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server rejected the credential. The caller should ask for a new
    /// one rather than report an error.
    #[error("{}", AUTH_ERROR_SENTINEL)]
    AuthRequired,

    #[error("{0}")]
    Server(String),

    #[error("Could not reach the server: {0}")]
    Connectivity(String),
}

/// HTTP client for the relay's `/api` surface.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        url::Url::parse(base_url).map_err(|e| {
            ClientError::Connectivity(format!("invalid server URL '{base_url}': {e}"))
        })?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Connectivity(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the relay whether `api_key` is usable. Never fails: every problem,
    /// including an unreachable server, comes back as `valid: false` with a
    /// reason.
    pub async fn validate_api_key(&self, api_key: &str) -> ValidateResponse {
        let request = ValidateRequest {
            api_key: Some(api_key.to_string()),
        };

        let response = match self
            .http
            .post(self.url("/api/validate"))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e.without_url(), "Key validation request failed");
                return ValidateResponse::invalid(
                    "Network error: could not communicate with the server",
                );
            }
        };

        let status = response.status();
        match read_json::<ValidateResponse>(response).await {
            Ok(body) if body.valid => ValidateResponse::valid(),
            Ok(body) => ValidateResponse::invalid(
                body.error
                    .unwrap_or_else(|| format!("Server error ({})", status.as_u16())),
            ),
            Err(e) => ValidateResponse::invalid(e.to_string()),
        }
    }

    /// Relay one turn. `history` is the full transcript including the new
    /// user message as its last entry.
    pub async fn send_message(
        &self,
        history: &[Message],
        new_message: &str,
        api_key: &str,
    ) -> Result<String, ClientError> {
        if api_key.trim().is_empty() {
            return Err(ClientError::AuthRequired);
        }

        let request = ChatRequest {
            api_key: Some(api_key.to_string()),
            history: Some(history.to_vec()),
            message: new_message.to_string(),
            system_instruction: None,
        };

        let response = self
            .http
            .post(self.url("/api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Connectivity(e.without_url().to_string()))?;

        // A proxy or fallback page can carry any status, 401 included.
        ensure_json(&response)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AuthRequired);
        }

        if status.is_success() {
            let body: ChatResponse = read_json(response).await?;
            return Ok(body.text);
        }

        let body: ErrorResponse = read_json(response).await?;
        if body.error == AUTH_ERROR_SENTINEL {
            return Err(ClientError::AuthRequired);
        }
        Err(ClientError::Server(body.error))
    }
}

/// Anything but JSON (an HTML fallback page, a proxy error) means the relay
/// itself was not reached.
fn ensure_json(response: &Response) -> Result<(), ClientError> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"));

    if is_json {
        return Ok(());
    }

    let status = response.status().as_u16();
    tracing::warn!(status, "Relay returned a non-JSON response");
    Err(ClientError::Connectivity(format!(
        "unexpected non-JSON response (status {status})"
    )))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    ensure_json(&response)?;
    response
        .json()
        .await
        .map_err(|e| ClientError::Connectivity(e.without_url().to_string()))
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    config::GeminiConfig,
    error::{InnerEarError, Result},
    llm::error::GeminiError,
    models::{ApiKey, Role},
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// One conversational turn in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set on reasoning parts that are not meant for the reader.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Content {
    pub fn text(role: Option<Role>, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: Some(text.into()),
                thought: None,
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Visible text of the first candidate, parts concatenated in order.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.as_deref())
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Why the response carried no text, when the provider said so.
    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
            .or_else(|| {
                self.candidates
                    .first()
                    .and_then(|candidate| candidate.finish_reason.as_deref())
                    .filter(|reason| *reason != "STOP")
            })
    }
}

/// Thin `generateContent` client. Exactly one HTTP request per call; no
/// retries.
#[derive(Clone)]
pub struct GeminiApiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiApiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| {
                InnerEarError::Internal(format!("Failed to create Gemini HTTP client: {error}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    pub async fn generate_content(
        &self,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, GeminiError> {
        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key.expose())
            .json(request)
            .send()
            .await
            .map_err(GeminiError::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(GeminiError::transport)?;

        if !status.is_success() {
            let error = GeminiError::from_response(status.as_u16(), &body);
            tracing::debug!(
                status = status.as_u16(),
                api_status = ?error.api_status,
                reasons = ?error.reasons,
                "Gemini request failed"
            );
            return Err(error);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(response_len = body.len(), error = %e, "Failed to parse Gemini response");
            GeminiError::unexpected(format!("Failed to parse Gemini response: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::text(Some(Role::User), "hi")],
            system_instruction: Some(Content::text(None, "Be a mentor.")),
            generation_config: Some(GenerationConfig { temperature: 0.7 }),
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "Be a mentor."}]},
                "generationConfig": {"temperature": 0.7}
            })
        );
    }

    #[test]
    fn probe_request_omits_optional_sections() {
        let request = GenerateContentRequest {
            contents: vec![Content::text(Some(Role::User), "Test")],
            system_instruction: None,
            generation_config: None,
        };

        let value = serde_json::to_value(&request).expect("serialize");
        assert!(value.get("systemInstruction").is_none());
        assert!(value.get("generationConfig").is_none());
    }

    #[test]
    fn response_text_joins_parts_and_skips_thoughts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "Listen "},
                        {"text": "first."}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .expect("deserialize");

        assert_eq!(response.text().as_deref(), Some("Listen first."));
        assert_eq!(response.block_reason(), None);
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .expect("deserialize");

        assert_eq!(response.text(), None);
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }

    #[test]
    fn endpoint_uses_configured_model() {
        let client = GeminiApiClient::new(&GeminiConfig {
            base_url: "http://localhost:9999/".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_secs: 5,
        })
        .expect("client");

        assert_eq!(client.base_url(), "http://localhost:9999");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}

use crate::config::GeminiConfig;
use crate::error::{InnerEarError, Result};
use crate::llm::api::{Content, GeminiApiClient, GenerateContentRequest, GenerationConfig};
use crate::models::{ApiKey, Message, Role};

/// Sampling temperature for every chat turn.
pub const CHAT_TEMPERATURE: f64 = 0.7;

/// Cheapest prompt that still exercises the key against the model.
const PROBE_PROMPT: &str = "Test";

/// Everything before the final transcript entry. The final entry is the
/// utterance being sent as the current turn, so it must not also appear as
/// context.
pub fn prior_context(history: &[Message]) -> &[Message] {
    match history.split_last() {
        Some((_, prior)) => prior,
        None => &[],
    }
}

/// Assemble one chat turn: persona, prior context, then `message`.
pub fn build_chat_request(
    history: &[Message],
    message: &str,
    system_instruction: &str,
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = prior_context(history)
        .iter()
        .map(|entry| Content::text(Some(entry.role), entry.content.clone()))
        .collect();
    contents.push(Content::text(Some(Role::User), message));

    let system_instruction = Some(system_instruction)
        .filter(|text| !text.trim().is_empty())
        .map(|text| Content::text(None, text));

    GenerateContentRequest {
        contents,
        system_instruction,
        generation_config: Some(GenerationConfig {
            temperature: CHAT_TEMPERATURE,
        }),
    }
}

fn probe_request() -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(Some(Role::User), PROBE_PROMPT)],
        system_instruction: None,
        generation_config: None,
    }
}

/// Stateless relay to the Gemini API. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct LlmProvider {
    client: GeminiApiClient,
}

impl LlmProvider {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        Ok(Self {
            client: GeminiApiClient::new(config)?,
        })
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Probe the key with a minimal request. `Ok(())` means the provider
    /// accepted it.
    pub async fn validate_key(&self, api_key: &ApiKey) -> Result<()> {
        self.client
            .generate_content(api_key, &probe_request())
            .await
            .map(|_| ())
            .map_err(|error| {
                let status = error.status;
                let class = error.classify();
                let error = InnerEarError::from(error);
                if error.is_credential_failure() {
                    tracing::info!(?status, ?class, "API key rejected by Gemini");
                } else {
                    tracing::warn!(?status, ?class, "API key validation failed");
                }
                error
            })
    }

    /// Send one turn and return the generated text.
    pub async fn chat(
        &self,
        api_key: &ApiKey,
        history: &[Message],
        message: &str,
        system_instruction: &str,
    ) -> Result<String> {
        if message.trim().is_empty() {
            return Err(InnerEarError::Validation("Message is required".to_string()));
        }

        let request = build_chat_request(history, message, system_instruction);
        tracing::debug!(
            context_turns = request.contents.len() - 1,
            model = %self.client.model(),
            "Relaying chat turn"
        );

        let response = self
            .client
            .generate_content(api_key, &request)
            .await
            .map_err(|error| {
                tracing::error!(
                    status = ?error.status,
                    api_status = ?error.api_status,
                    class = ?error.classify(),
                    "Chat relay failed"
                );
                InnerEarError::from(error)
            })?;

        response.text().ok_or_else(|| {
            let reason = response.block_reason().unwrap_or("no candidates returned");
            InnerEarError::Provider(format!("Gemini returned no text ({reason})"))
        })
    }
}

use crate::llm::persona::GREETING;
use crate::models::{ApiKey, Message};

use super::relay::{ClientError, RelayClient};

/// What happened to one attempted turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reply was appended to the transcript.
    Replied,
    /// No usable credential. The transcript is unchanged and the caller
    /// should collect a key before retrying.
    NeedsCredential,
    /// The turn failed; an error message was appended to the transcript.
    Failed(String),
    /// Blank input, nothing was sent.
    Ignored,
}

/// One conversation: the transcript, the credential and the loading flag.
///
/// `send` borrows the session mutably for the whole round trip, so a second
/// turn cannot start while one is in flight.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<Message>,
    api_key: Option<ApiKey>,
    is_loading: bool,
}

impl ChatSession {
    /// New session opened with the mentor's greeting.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            messages: vec![Message::model(GREETING)],
            api_key: ApiKey::from_request(api_key.as_deref()).ok(),
            is_loading: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        self.api_key = ApiKey::from_request(Some(&api_key)).ok();
    }

    pub fn clear_api_key(&mut self) {
        self.api_key = None;
    }

    pub async fn send(&mut self, text: &str, relay: &RelayClient) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }

        let Some(api_key) = self.api_key.clone() else {
            return TurnOutcome::NeedsCredential;
        };

        self.messages.push(Message::user(text));
        self.is_loading = true;
        let result = relay.send_message(&self.messages, text, api_key.expose()).await;
        self.is_loading = false;

        match result {
            Ok(reply) => {
                self.messages.push(Message::model(reply));
                TurnOutcome::Replied
            }
            Err(ClientError::AuthRequired) => {
                // The turn never reached the model; drop it so a retry with a
                // new key does not repeat the question.
                self.messages.pop();
                self.api_key = None;
                TurnOutcome::NeedsCredential
            }
            Err(error) => {
                tracing::warn!(error = %error, "Chat turn failed");
                let message = error.to_string();
                self.messages
                    .push(Message::model(format!("An error occurred: {message}")));
                TurnOutcome::Failed(message)
            }
        }
    }
}

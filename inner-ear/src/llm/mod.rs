mod api;
mod error;
pub mod persona;
mod provider;

pub use api::{Content, GeminiApiClient, GenerateContentRequest, GenerateContentResponse, Part};
pub use error::{ErrorClass, GeminiError};
pub use provider::{build_chat_request, prior_context, LlmProvider, CHAT_TEMPERATURE};

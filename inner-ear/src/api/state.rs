use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::llm::persona::load_persona;
use crate::llm::LlmProvider;

/// Shared, read-only state. Nothing here is mutated after startup, so
/// concurrent requests never coordinate.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: LlmProvider,
    /// Default persona, used when a chat request carries none.
    pub persona: Arc<str>,
}

impl AppState {
    pub fn new(config: Config, llm: LlmProvider, persona: Arc<str>) -> Self {
        Self {
            config: Arc::new(config),
            llm,
            persona,
        }
    }

    /// Build provider and persona from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let llm = LlmProvider::new(&config.gemini)?;
        let persona = load_persona(config.server.persona_file.as_deref())?;
        Ok(Self::new(config, llm, persona))
    }
}

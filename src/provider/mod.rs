use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::errors::ApiError;
use crate::wire::ChatMessage;

pub mod openai;

/// One content unit of the final user message. Text anchors and image
/// references are interleaved in caller order so the model can correlate them.
#[derive(Debug, Clone)]
pub enum ContentPart {
    Text(String),
    ImageUrl(String),
}

/// A single upstream chat-completion call, fully shaped by a prompt builder.
#[derive(Debug, Clone, Default)]
pub struct ChatCall {
    pub system: String,
    /// Prior conversation turns, used only by the plain chat feature.
    pub history: Vec<ChatMessage>,
    /// The final user message, empty when `history` already carries it.
    pub parts: Vec<ContentPart>,
    /// Ask the provider to force a JSON object response.
    pub json_mode: bool,
    /// Output-length hint for short-form answers.
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Run a chat completion and return the raw assistant text. Exactly one
    /// attempt; classification of transport/quota failures happens here.
    async fn chat(&self, call: &ChatCall) -> Result<String, ApiError>;

    /// Generate one image from a finished prompt and return its URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, ApiError>;
}

pub type DynProvider = Arc<dyn AiProvider>;

pub fn make_provider(cfg: &Config) -> DynProvider {
    Arc::new(openai::OpenAiProvider::new(
        cfg.api_key.clone(),
        cfg.chat_model.clone(),
        cfg.image_model.clone(),
        cfg.timeout_secs,
    ))
}

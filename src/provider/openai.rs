use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::ApiError;

use super::{AiProvider, ChatCall, ContentPart};

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

pub struct OpenAiProvider {
    api_key: String,
    chat_model: String,
    image_model: String,
    client: Client,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: String, chat_model: String, image_model: String, timeout_secs: u64) -> Self {
        Self {
            api_key,
            chat_model,
            image_model,
            client: Client::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn messages_for(call: &ChatCall) -> Vec<Value> {
        let mut messages = Vec::new();
        if !call.system.is_empty() {
            messages.push(json!({ "role": "system", "content": call.system }));
        }
        for m in &call.history {
            messages.push(json!({ "role": m.role, "content": m.content }));
        }
        if !call.parts.is_empty() {
            // A single text part goes out as a plain string; anything with
            // images uses the multi-part content array.
            if let [ContentPart::Text(text)] = call.parts.as_slice() {
                messages.push(json!({ "role": "user", "content": text }));
            } else {
                let content: Vec<Value> = call
                    .parts
                    .iter()
                    .map(|p| match p {
                        ContentPart::Text(t) => json!({ "type": "text", "text": t }),
                        ContentPart::ImageUrl(url) => {
                            json!({ "type": "image_url", "image_url": { "url": url } })
                        }
                    })
                    .collect();
                messages.push(json!({ "role": "user", "content": content }));
            }
        }
        messages
    }
}

fn classify_transport(err: reqwest::Error) -> ApiError {
    if err.is_connect() || err.is_timeout() {
        ApiError::UpstreamUnavailable(err.to_string())
    } else {
        ApiError::Internal(err.to_string())
    }
}

fn classify_http(status: StatusCode, text: &str) -> ApiError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        ApiError::UpstreamRateLimited(format!("OpenAI API error ({status}): {text}"))
    } else if status.is_server_error() {
        ApiError::UpstreamUnavailable(format!("OpenAI API error ({status}): {text}"))
    } else {
        ApiError::Internal(format!("OpenAI API error ({status}): {text}"))
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn chat(&self, call: &ChatCall) -> Result<String, ApiError> {
        let mut body = json!({
            "model": self.chat_model,
            "messages": Self::messages_for(call),
        });
        if call.json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        if let Some(max_tokens) = call.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        debug!(model = %self.chat_model, json_mode = call.json_mode, "chat completion request");

        let resp = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(classify_transport)?;
        if !status.is_success() {
            return Err(classify_http(status, &text));
        }

        // Minimal structs to parse the chat response
        #[derive(Deserialize)]
        struct Message {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }
        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::ContractViolation(format!("unparseable chat response: {e}")))?;

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ApiError::ContractViolation("model returned empty content".into()));
        }
        Ok(content)
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, ApiError> {
        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "size": "1024x1024",
            "quality": "standard",
            "n": 1,
        });

        debug!(model = %self.image_model, "image generation request");

        let resp = self
            .client
            .post(IMAGES_URL)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(classify_transport)?;
        if !status.is_success() {
            return Err(classify_http(status, &text));
        }

        #[derive(Deserialize)]
        struct ImageDatum {
            url: Option<String>,
        }
        #[derive(Deserialize)]
        struct ImagesResponse {
            data: Vec<ImageDatum>,
        }

        let parsed: ImagesResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::ContractViolation(format!("unparseable images response: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| ApiError::ContractViolation("images response carried no URL".into()))
    }
}

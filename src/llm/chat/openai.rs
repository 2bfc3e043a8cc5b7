use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;

use super::{ authorized_http_client, completions_url, post_chat_completion, ChatClient };
use crate::error::{ ChatError, ServiceError };
use crate::llm::{ CompletionRequest, CompletionResponse, LlmConfig };

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Any OpenAI-compatible chat-completions endpoint.
pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

impl OpenAIChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, ChatError> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::Config("OpenAI API key is required".to_string()));
        }

        Ok(Self {
            http: authorized_http_client(&config.api_key, config.timeout)?,
            model: config.completion_model
                .clone()
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            base_url: config.base_url
                .clone()
                .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, ServiceError> {
        let url = completions_url(&self.base_url);
        debug!("OpenAI request: model={}, messages={}", request.model, request.messages.len());
        post_chat_completion(&self.http, &url, request).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

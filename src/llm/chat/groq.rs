use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use std::time::Duration;

use super::{ authorized_http_client, completions_url, post_chat_completion, ChatClient };
use crate::error::{ ChatError, ServiceError };
use crate::llm::{ CompletionRequest, CompletionResponse, LlmConfig };

pub const GROQ_DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const GROQ_DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

impl GroqChatClient {
    pub fn new(
        api_key: &str,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration
    ) -> Result<Self, ChatError> {
        let chat_model = model.unwrap_or_else(|| GROQ_DEFAULT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| GROQ_DEFAULT_BASE_URL.to_string());
        let http = authorized_http_client(api_key, timeout)?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ChatError> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::Config("Groq API key is required".to_string()));
        }

        Self::new(
            &config.api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.timeout
        )
    }
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, ServiceError> {
        let url = completions_url(&self.base_url);
        debug!("Groq request: model={}, messages={}", request.model, request.messages.len());
        post_chat_completion(&self.http, &url, request).await
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}

pub mod groq;
pub mod openai;

use async_trait::async_trait;
use log::warn;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{ CompletionRequest, CompletionResponse, LlmConfig, LlmType };
use self::groq::GroqChatClient;
use self::openai::OpenAIChatClient;
use crate::error::{ ChatError, ServiceError };

const COMPLETIONS_ROUTE: &str = "/chat/completions";

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        request: &CompletionRequest
    ) -> Result<CompletionResponse, ServiceError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ChatError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Groq => {
            let specific_client = GroqChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

/// Builds a reqwest client carrying the bearer key on every request.
pub(crate) fn authorized_http_client(
    api_key: &str,
    timeout: Duration
) -> Result<HttpClient, ChatError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e|
        ChatError::Config(format!("Invalid API key format: {}", e))
    )?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {}", e)))
}

pub(crate) fn completions_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), COMPLETIONS_ROUTE)
}

#[derive(Deserialize)]
struct CompletionBody {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// POSTs an OpenAI-compatible chat completion and returns the first choice, trimmed.
pub(crate) async fn post_chat_completion(
    http: &HttpClient,
    url: &str,
    request: &CompletionRequest
) -> Result<CompletionResponse, ServiceError> {
    let resp = http.post(url).json(request).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let err = classify_failure(status.as_u16(), &body);
        warn!("Completion request to {} failed: {}", url, err);
        return Err(err);
    }

    let body = resp.json::<CompletionBody>().await?;
    let content = body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ServiceError::EmptyResponse)?;

    Ok(CompletionResponse { response: content })
}

fn classify_failure(status: u16, body: &str) -> ServiceError {
    let message = serde_json
        ::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() { format!("HTTP {}", status) } else { body.trim().to_string() }
        });

    match status {
        401 | 403 => ServiceError::Auth(message),
        429 => ServiceError::RateLimited(message),
        _ => ServiceError::Api { status, message },
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every request it sees.
    pub struct ScriptedChatClient {
        replies: Mutex<VecDeque<Result<String, ServiceError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedChatClient {
        pub fn new(replies: Vec<Result<String, ServiceError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChatClient {
        async fn complete(
            &self,
            request: &CompletionRequest
        ) -> Result<CompletionResponse, ServiceError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(response)) => Ok(CompletionResponse { response }),
                Some(Err(e)) => Err(e),
                None => Err(ServiceError::Network("no scripted reply left".into())),
            }
        }

        fn get_model(&self) -> String {
            "scripted".to_string()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }
}

use log::{ error, info };
use std::sync::Arc;

use super::{ build_request, Session, TurnState };
use crate::config::prompt::PromptProfile;
use crate::error::ChatError;
use crate::llm::chat::ChatClient;
use crate::llm::{ CompletionRequest, LlmConfig, RequestMessage };
use crate::models::chat::ChatMessage;

/// Runs turns for any number of sessions. Holds no session state itself.
#[derive(Clone)]
pub struct ConversationManager {
    chat_client: Arc<dyn ChatClient>,
    profile: PromptProfile,
    seed: Option<ChatMessage>,
    window_size: Option<usize>,
    temperature: f32,
    max_tokens: u32,
}

impl ConversationManager {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        profile: PromptProfile,
        window_size: Option<usize>,
        llm: &LlmConfig
    ) -> Self {
        let seed = profile.greeting.clone().map(ChatMessage::assistant);
        Self {
            chat_client,
            profile,
            seed,
            window_size,
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        }
    }

    pub fn profile(&self) -> &PromptProfile {
        &self.profile
    }

    pub fn window_size(&self) -> Option<usize> {
        self.window_size
    }

    pub fn model(&self) -> String {
        self.chat_client.get_model()
    }

    /// A session in this profile's initial state. Every session shares the same
    /// greeting message, so a cleared session equals a fresh one.
    pub fn new_session(&self) -> Session {
        match &self.seed {
            Some(seed) => Session::seeded(seed.clone()),
            None => Session::new(),
        }
    }

    pub fn build_request(&self, session: &Session, new_text: &str) -> CompletionRequest {
        let instructions = self.profile.render_instructions(new_text);
        let messages = build_request(session.messages(), new_text, &instructions, self.window_size);

        CompletionRequest {
            model: self.chat_client.get_model(),
            messages: messages.iter().map(RequestMessage::from).collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, ChatError> {
        let resp = self.chat_client.complete(request).await?;
        Ok(resp.response)
    }

    /// One turn: the user text and the reply are appended together, only after
    /// the completion succeeds. A failed turn leaves the log untouched.
    pub async fn submit(&self, session: &mut Session, text: &str) -> Result<String, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let request = self.build_request(session, text);
        info!(
            "Session {}: sending turn with {} message(s) to model {}",
            session.id(),
            request.messages.len(),
            request.model
        );

        session.set_state(TurnState::AwaitingResponse);
        let outcome = self.complete(&request).await;
        session.set_state(TurnState::Idle);

        match outcome {
            Ok(reply) => {
                session.append_user_turn(text)?;
                session.append_assistant_turn(&reply);
                Ok(reply)
            }
            Err(e) => {
                error!("Session {}: turn failed: {}", session.id(), e);
                Err(e)
            }
        }
    }
}

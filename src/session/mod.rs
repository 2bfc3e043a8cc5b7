//! Per-user conversation state and the turn flow around it.

mod manager;
mod request;

pub use manager::ConversationManager;
pub use request::build_request;

use log::debug;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ChatError;
use crate::models::chat::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Idle,
    AwaitingResponse,
}

/// The message log of one interactive session. Owned by exactly one surface
/// (a connection or the console) and passed by `&mut` through each turn.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    messages: Vec<ChatMessage>,
    seed: Option<ChatMessage>,
    state: TurnState,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            seed: None,
            state: TurnState::Idle,
        }
    }

    /// A session whose log starts with an assistant greeting; `clear` restores it.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self::seeded(ChatMessage::assistant(greeting))
    }

    /// Starts from an existing seed message. Sessions sharing one seed compare equal
    /// after `clear`.
    pub fn seeded(seed: ChatMessage) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: vec![seed.clone()],
            seed: Some(seed),
            state: TurnState::Idle,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_seeded(&self) -> bool {
        self.seed.is_some()
    }

    pub fn append_user_turn(&mut self, text: &str) -> Result<(), ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.messages.push(ChatMessage::user(text));
        Ok(())
    }

    pub fn append_assistant_turn(&mut self, text: &str) {
        self.messages.push(ChatMessage::assistant(text));
    }

    /// Drops every turn, keeping only the seeded greeting if there was one.
    pub fn clear(&mut self) {
        debug!("Clearing session {} ({} messages)", self.id, self.messages.len());
        self.messages.clear();
        if let Some(seed) = &self.seed {
            self.messages.push(seed.clone());
        }
        self.state = TurnState::Idle;
    }

    pub(crate) fn set_state(&mut self, state: TurnState) {
        self.state = state;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn transcript(session: &Session) -> Vec<(Role, String)> {
        session.messages()
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[test]
    fn rejects_blank_user_text() {
        let mut session = Session::new();
        assert!(matches!(session.append_user_turn(""), Err(ChatError::EmptyMessage)));
        assert!(matches!(session.append_user_turn(" \n\t"), Err(ChatError::EmptyMessage)));
        assert!(session.is_empty());
    }

    #[test]
    fn appends_in_conversational_order() {
        let mut session = Session::new();
        session.append_user_turn("I want to read daily").unwrap();
        session.append_assistant_turn("Read one page tonight.");

        let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn clear_restores_initial_state_for_any_history_length() {
        for turns in [0usize, 1, 3, 25] {
            let mut plain = Session::new();
            let mut seeded = Session::with_greeting("Hi! What habit?");
            let fresh_seeded = transcript(&Session::with_greeting("Hi! What habit?"));

            for i in 0..turns {
                for session in [&mut plain, &mut seeded] {
                    session.append_user_turn(&format!("q{}", i)).unwrap();
                    session.append_assistant_turn(&format!("a{}", i));
                }
            }

            plain.clear();
            seeded.clear();
            assert!(plain.is_empty());
            assert_eq!(transcript(&seeded), fresh_seeded);
            assert_eq!(seeded.state(), TurnState::Idle);
        }
    }
}

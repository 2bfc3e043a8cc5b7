use thiserror::Error;

/// Failure of the remote completion call. Never retried; reported at the turn boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication rejected by provider: {0}")]
    Auth(String),
    #[error("rate limited by provider: {0}")]
    RateLimited(String),
    #[error("provider returned HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
    },
    #[error("failed to decode provider response: {0}")]
    Decode(String),
    #[error("provider returned no completion")]
    EmptyResponse,
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("message must not be empty")]
    EmptyMessage,
}

impl ChatError {
    /// Text shown to the user when a turn fails.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::EmptyMessage => "Please type a message first.".to_string(),
            other => format!("Sorry, I encountered an error: {}", other),
        }
    }
}

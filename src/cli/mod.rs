use clap::Parser;
use std::fmt;
use std::str::FromStr;

use crate::config::prompt::DEFAULT_PROFILE;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// How to talk to users: `serve` (WebSocket server) or `repl` (interactive console)
    #[arg(long, env = "CHAT_MODE", default_value = "serve")]
    pub mode: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (groq, openai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "groq")]
    pub chat_llm_type: String,

    /// Base URL of the provider's OpenAI-compatible API (e.g., https://api.groq.com/openai/v1)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// API key for the provider. Falls back to GROQ_API_KEY / OPENAI_API_KEY when empty.
    #[arg(long, env = "CHAT_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., llama3-70b-8192, gpt-4o-mini)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Sampling temperature sent with every completion request (0.0 to 2.0).
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.7")]
    pub temperature: f32,

    /// Maximum number of tokens the model may generate per reply.
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "1024")]
    pub max_tokens: u32,

    /// Seconds to wait for the provider before the turn fails.
    #[arg(long, env = "CHAT_TIMEOUT_SECS", default_value = "60")]
    pub request_timeout_secs: u64,

    // --- Prompt Args ---
    /// Path to a prompt profile file. The built-in profiles are used when unset.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Name of the prompt profile to chat with (habit_coach, habit_planner, ...)
    #[arg(long, env = "CHAT_PROFILE", default_value = DEFAULT_PROFILE)]
    pub profile: String,

    /// Number of prior messages sent as context. Overrides the profile's window.
    #[arg(long, env = "CONTEXT_WINDOW")]
    pub context_window: Option<usize>,

    // --- Server Args ---
    /// Host address and port for the WebSocket server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional port for the HTTP API (health and profile inspection).
    #[arg(long, env = "HTTP_PORT")]
    pub http_port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Repl,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "serve" | "server" => Ok(RunMode::Serve),
            "repl" | "console" => Ok(RunMode::Repl),
            _ => Err(format!("Unsupported mode: {}", s)),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Serve => write!(f, "serve"),
            RunMode::Repl => write!(f, "repl"),
        }
    }
}

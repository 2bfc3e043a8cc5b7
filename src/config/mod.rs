pub mod prompt;

use std::time::Duration;

use crate::cli::{ Args, RunMode };
use crate::error::ChatError;
use crate::llm::{ LlmConfig, LlmType };
use self::prompt::{ builtin_prompts, load_prompts, PromptConfig, PromptProfile };

/// Everything needed to start a surface, validated once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: RunMode,
    pub llm: LlmConfig,
    pub profile: PromptProfile,
    pub window_size: Option<usize>,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, ChatError> {
        Self::from_args_with_env(args, |name| std::env::var(name).ok())
    }

    pub fn from_args_with_env<F>(args: &Args, env_lookup: F) -> Result<Self, ChatError>
        where F: Fn(&str) -> Option<String>
    {
        let mode: RunMode = args.mode.parse().map_err(ChatError::Config)?;
        let llm_type: LlmType = args.chat_llm_type
            .parse()
            .map_err(|e| ChatError::Config(format!("{}", e)))?;

        let api_key = resolve_api_key(&args.chat_api_key, llm_type, env_lookup)?;

        if !(0.0..=2.0).contains(&args.temperature) {
            return Err(
                ChatError::Config(
                    format!("temperature must be between 0.0 and 2.0, got {}", args.temperature)
                )
            );
        }
        if args.max_tokens == 0 {
            return Err(ChatError::Config("max tokens must be greater than zero".into()));
        }
        if args.request_timeout_secs == 0 {
            return Err(ChatError::Config("request timeout must be greater than zero".into()));
        }

        let prompts: PromptConfig = match &args.prompts_path {
            Some(path) =>
                load_prompts(path).map_err(|e|
                    ChatError::Config(format!("Failed to load prompts file '{}': {}", path, e))
                )?,
            None => builtin_prompts().map_err(|e| ChatError::Config(e.to_string()))?,
        };
        let profile = prompts.profile(&args.profile).map_err(|e| {
            ChatError::Config(
                format!("{} (available: {})", e, prompts.profile_names().join(", "))
            )
        })?;
        let window_size = args.context_window.or(profile.window_size);

        let llm = LlmConfig {
            llm_type,
            api_key,
            completion_model: args.chat_model.clone().filter(|m| !m.trim().is_empty()),
            base_url: args.chat_base_url.clone().filter(|u| !u.trim().is_empty()),
            temperature: args.temperature,
            max_tokens: args.max_tokens,
            timeout: Duration::from_secs(args.request_timeout_secs),
        };

        Ok(Self {
            mode,
            llm,
            profile,
            window_size,
        })
    }
}

/// The explicit key wins; otherwise the provider's own variable is consulted.
fn resolve_api_key<F>(explicit: &str, llm_type: LlmType, env_lookup: F) -> Result<String, ChatError>
    where F: Fn(&str) -> Option<String>
{
    let key = if !explicit.trim().is_empty() {
        explicit.trim().to_string()
    } else {
        env_lookup(llm_type.api_key_env())
            .map(|k| k.trim().to_string())
            .unwrap_or_default()
    };

    if key.is_empty() {
        return Err(
            ChatError::Config(
                format!(
                    "{} not found in environment variables. Please set it (or CHAT_API_KEY) in your .env file.",
                    llm_type.api_key_env()
                )
            )
        );
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(ChatError::Config("API key contains control characters".into()));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// Parses `extra` with every environment-backed setting pinned, so variables
    /// like `CHAT_PROFILE` or `CONTEXT_WINDOW` in the test environment cannot leak in.
    fn args(extra: &[&str]) -> Args {
        const PINNED: [(&str, &str); 6] = [
            ("--mode", "serve"),
            ("--chat-llm-type", "groq"),
            ("--temperature", "0.7"),
            ("--max-tokens", "1024"),
            ("--request-timeout-secs", "60"),
            ("--profile", "habit_coach"),
        ];
        let mut argv = vec!["habit-chat"];
        for (flag, value) in PINNED {
            if !extra.contains(&flag) {
                argv.extend_from_slice(&[flag, value]);
            }
        }
        argv.extend_from_slice(extra);

        let mut args = Args::try_parse_from(argv).unwrap();
        if !extra.contains(&"--prompts-path") {
            args.prompts_path = None;
        }
        if !extra.contains(&"--context-window") {
            args.context_window = None;
        }
        if !extra.contains(&"--chat-model") {
            args.chat_model = None;
        }
        if !extra.contains(&"--chat-base-url") {
            args.chat_base_url = None;
        }
        args
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = AppConfig::from_args_with_env(&args(&["--chat-api-key", ""]), no_env).unwrap_err();
        match err {
            ChatError::Config(msg) => assert!(msg.contains("GROQ_API_KEY")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn falls_back_to_provider_variable() {
        let config = AppConfig::from_args_with_env(&args(&["--chat-api-key", " ", "--profile", "habit_coach"]), |name| {
            (name == "GROQ_API_KEY").then(|| "gsk_from_env".to_string())
        }).unwrap();
        assert_eq!(config.llm.api_key, "gsk_from_env");
        assert_eq!(config.llm.llm_type, LlmType::Groq);
        assert_eq!(config.profile.name, "habit_coach");
        assert_eq!(config.window_size, Some(4));
        assert_eq!(config.mode, RunMode::Serve);
    }

    #[test]
    fn ignores_ambient_profile_and_window_variables() {
        let config = AppConfig::from_args_with_env(&args(&["--chat-api-key", "k"]), no_env).unwrap();
        assert_eq!(config.profile.name, prompt::DEFAULT_PROFILE);
        assert_eq!(config.window_size, Some(4));
        assert_eq!(config.llm.completion_model, None);
        assert_eq!(config.llm.base_url, None);
    }

    #[test]
    fn cli_window_overrides_profile() {
        let config = AppConfig::from_args_with_env(
            &args(&["--chat-api-key", "k", "--profile", "habit_planner", "--context-window", "10"]),
            no_env
        ).unwrap();
        assert_eq!(config.profile.window_size, None);
        assert_eq!(config.window_size, Some(10));
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let hot = args(&["--chat-api-key", "k", "--temperature", "3.5"]);
        assert!(matches!(AppConfig::from_args_with_env(&hot, no_env), Err(ChatError::Config(_))));

        let unknown = args(&["--chat-api-key", "k", "--profile", "poet"]);
        match AppConfig::from_args_with_env(&unknown, no_env) {
            Err(ChatError::Config(msg)) => assert!(msg.contains("habit_coach")),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod repl;
pub mod server;
pub mod session;

use cli::{ Args, RunMode };
use config::AppConfig;
use error::ChatError;
use llm::chat::new_client as new_chat_client;
use log::info;
use server::Server;
use session::ConversationManager;
use std::error::Error;
use std::sync::Arc;

/// Validates configuration and builds the manager. Every failure here is fatal.
pub fn initialize(args: &Args) -> Result<(AppConfig, Arc<ConversationManager>), ChatError> {
    let config = AppConfig::from_args(args)?;
    let chat_client = new_chat_client(&config.llm)?;
    info!(
        "Chat client configured: Type={}, Model={}, BaseURL={}",
        config.llm.llm_type,
        chat_client.get_model(),
        chat_client.get_base_url().as_deref().unwrap_or("adapter default")
    );

    let manager = ConversationManager::new(
        chat_client,
        config.profile.clone(),
        config.window_size,
        &config.llm
    );
    Ok((config, Arc::new(manager)))
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (config, manager) = initialize(&args)?;

    info!("--- Core Configuration ---");
    info!("Mode: {}", config.mode);
    info!("Chat LLM Type: {}", config.llm.llm_type);
    info!("Prompt Profile: {}", config.profile.name);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("built-in"));
    match config.window_size {
        Some(window) => info!("Context Window: {} message(s)", window),
        None => info!("Context Window: unbounded"),
    }
    info!("Temperature: {}", config.llm.temperature);
    info!("Max Tokens: {}", config.llm.max_tokens);
    if config.mode == RunMode::Serve {
        info!("Server Address: {}", args.server_addr);
        if let Some(port) = args.http_port {
            info!("HTTP API Port: {}", port);
        }
    }
    info!("-------------------------");

    match config.mode {
        RunMode::Serve => {
            let server = Server::new(args.server_addr.clone(), manager, args.http_port);
            server.run().await?;
        }
        RunMode::Repl => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run_repl(&manager, stdin, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}

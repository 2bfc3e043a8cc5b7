use clap::Parser;
use dotenv::dotenv;
use habit_chat::cli::Args;
use habit_chat::error::ChatError;
use log::error;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = habit_chat::run(args).await {
        match e.downcast_ref::<ChatError>() {
            Some(ChatError::Config(msg)) => {
                error!("Startup aborted: {}", msg);
                eprintln!("⚠️ {}", msg);
            }
            _ => {
                error!("Fatal error: {}", e);
                eprintln!("⚠️ {}", e);
            }
        }
        std::process::exit(1);
    }
}

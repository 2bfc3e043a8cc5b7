use crate::session::ConversationManager;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::get,
    Router,
    extract::State,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use log::{info, error};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ProfileResponse {
    name: String,
    model: String,
    window_size: Option<usize>,
    greeting: Option<String>,
    system_template: String,
}

#[derive(Clone)]
struct AppState {
    manager: Arc<ConversationManager>,
}

pub fn router(manager: Arc<ConversationManager>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/profile", get(profile_handler))
        .layer(cors)
        .with_state(AppState { manager })
}

pub async fn start_http_server(
    http_port: u16,
    manager: Arc<ConversationManager>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = format!("0.0.0.0:{}", http_port).parse::<SocketAddr>()?;
    info!("Starting HTTP API server on: http://{}", addr);

    let app = router(manager);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("HTTP server started");
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn profile_handler(State(state): State<AppState>) -> impl IntoResponse {
    let profile = state.manager.profile();
    Json(ProfileResponse {
        name: profile.name.clone(),
        model: state.manager.model(),
        window_size: state.manager.window_size(),
        greeting: profile.greeting.clone(),
        system_template: profile.system_template.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::prompt::builtin_prompts;
    use crate::llm::chat::mock::ScriptedChatClient;
    use crate::llm::{ LlmConfig, LlmType };

    #[tokio::test]
    async fn serves_health_and_active_profile() {
        let client = Arc::new(ScriptedChatClient::new(vec![]));
        let profile = builtin_prompts().unwrap().profile("habit_planner").unwrap();
        let llm = LlmConfig::new(LlmType::Groq, "test");
        let manager = Arc::new(ConversationManager::new(client, profile, Some(6), &llm));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(manager).into_make_service()).await.unwrap();
        });

        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        let health: serde_json::Value = http
            .get(format!("http://{}/api/health", addr))
            .send().await.unwrap()
            .json().await.unwrap();
        assert_eq!(health["status"], "ok");

        let profile: serde_json::Value = http
            .get(format!("http://{}/api/profile", addr))
            .send().await.unwrap()
            .json().await.unwrap();
        assert_eq!(profile["name"], "habit_planner");
        assert_eq!(profile["model"], "scripted");
        assert_eq!(profile["window_size"], 6);
        assert!(profile["greeting"].is_null());
    }
}

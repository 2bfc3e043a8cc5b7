pub mod api;
pub mod websocket;

use crate::session::ConversationManager;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    manager: Arc<ConversationManager>,
    http_port: Option<u16>,
}

impl Server {
    pub fn new(
        addr: String,
        manager: Arc<ConversationManager>,
        http_port: Option<u16>,
    ) -> Self {
        Self {
            addr,
            manager,
            http_port,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(http_port) = self.http_port {
            self.start_http_server(http_port).await?;
        }

        self.start_ws_server().await?;

        Ok(())
    }

    async fn start_http_server(&self, http_port: u16) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(http_port, self.manager.clone()).await
    }

    async fn start_ws_server(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        websocket::start_ws_server(&self.addr, self.manager.clone()).await
    }
}

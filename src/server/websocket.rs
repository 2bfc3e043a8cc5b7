use crate::error::ChatError;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::session::ConversationManager;

use std::error::Error;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::io::{ AsyncRead, AsyncWrite };

use tokio_tungstenite::{ accept_async, WebSocketStream };
use tokio_tungstenite::tungstenite::protocol::Message;

use lazy_static::lazy_static;
use governor::{ RateLimiter, Quota, state::{ InMemoryState, NotKeyed }, clock::DefaultClock };

use chrono::Utc;
use log::{ info, warn, error };
use futures::{ Sink, SinkExt, StreamExt };

const MAX_MESSAGE_SIZE: usize = 1 * 1024 * 1024;

lazy_static! {
    static ref CONNECTION_LIMITER: RateLimiter<NotKeyed, InMemoryState, DefaultClock> =
        RateLimiter::direct(
            Quota::per_second(NonZeroU32::new(10).unwrap_or(NonZeroU32::MIN))
        );
}

pub async fn start_ws_server(
    addr: &str,
    manager: Arc<ConversationManager>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("WS server listening on: {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;

        if CONNECTION_LIMITER.check().is_err() {
            warn!("Global connection rate limit exceeded for {}. Dropping connection.", peer);
            continue;
        }

        info!("Incoming connection from: {}", peer);
        let manager_clone = Arc::clone(&manager);

        tokio::spawn(async move {
            match accept_async(stream).await {
                Ok(ws) => handle_connection(peer, ws, manager_clone).await,
                Err(e) => error!("Handshake failed for {}: {}", peer, e),
            }
        });
    }
}

async fn send_frame<T>(tx: &mut T, frame: &ServerMessage) -> Result<(), Box<dyn Error + Send + Sync>>
    where T: Sink<Message> + Unpin, T::Error: Error + Send + Sync + 'static
{
    let json = serde_json::to_string(frame)?;
    tx.send(Message::Text(json)).await?;
    Ok(())
}

/// Serves one connection. The connection owns its session; it is dropped with the socket.
pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    manager: Arc<ConversationManager>
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    let (mut tx, mut rx) = websocket.split();
    let mut session = manager.new_session();
    info!("Assigned session {} to {}", session.id(), peer);

    let greeting = ServerMessage::History { messages: session.messages().to_vec() };
    if let Err(e) = send_frame(&mut tx, &greeting).await {
        error!("Error sending initial history to {}: {}", peer, e);
        return;
    }

    while let Some(msg) = rx.next().await {
        let message = match msg {
            Ok(message) => message,
            Err(e) => {
                match e {
                    | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                    | tokio_tungstenite::tungstenite::Error::Protocol(_)
                    | tokio_tungstenite::tungstenite::Error::Utf8 => {
                        info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                    }
                    _ => error!("Error receiving message from {}: {}", peer, e),
                }
                break;
            }
        };

        if message.len() > MAX_MESSAGE_SIZE {
            warn!(
                "Message from {} exceeds size limit ({} > {})",
                peer,
                message.len(),
                MAX_MESSAGE_SIZE
            );
            let frame = ServerMessage::Error { message: "Message too large".to_string() };
            if let Err(e) = send_frame(&mut tx, &frame).await {
                error!("Failed to send size limit error to {}: {}", peer, e);
            }
            break;
        }

        let reply = match message {
            Message::Text(text) =>
                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Chat { content }) => {
                        if content.trim().is_empty() {
                            ServerMessage::Error {
                                message: ChatError::EmptyMessage.user_message(),
                            }
                        } else {
                            if let Err(e) = send_frame(&mut tx, &ServerMessage::Processing).await {
                                error!("Error sending processing status to {}: {}", peer, e);
                                break;
                            }
                            match manager.submit(&mut session, &content).await {
                                Ok(reply) =>
                                    ServerMessage::Response {
                                        content: reply,
                                        timestamp: Utc::now().timestamp(),
                                    },
                                Err(e) => ServerMessage::Error { message: e.user_message() },
                            }
                        }
                    }
                    Ok(ClientMessage::Clear) => {
                        session.clear();
                        ServerMessage::Cleared { messages: session.messages().to_vec() }
                    }
                    Ok(ClientMessage::History) => {
                        ServerMessage::History { messages: session.messages().to_vec() }
                    }
                    Err(e) => {
                        warn!("Failed to parse message from {}: {}", peer, e);
                        ServerMessage::Error {
                            message: format!("Failed to parse message: {}", e),
                        }
                    }
                }
            Message::Close(_) => {
                info!("Received close frame from {}", peer);
                break;
            }
            Message::Ping(ping_data) => {
                if tx.send(Message::Pong(ping_data)).await.is_err() {
                    error!("Failed to send pong to {}", peer);
                    break;
                }
                continue;
            }
            Message::Binary(_) => {
                warn!("Ignoring binary message from {}", peer);
                continue;
            }
            Message::Pong(_) | Message::Frame(_) => {
                continue;
            }
        };

        if let Err(e) = send_frame(&mut tx, &reply).await {
            error!("Error sending reply to {}: {}", peer, e);
            break;
        }
    }

    info!(
        "WebSocket connection closed for {} (session {}, {} messages discarded)",
        peer,
        session.id(),
        session.len()
    );
}

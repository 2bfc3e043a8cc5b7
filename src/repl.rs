use std::error::Error;

use log::info;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

use crate::models::chat::{ ChatMessage, Role };
use crate::session::ConversationManager;

const HELP: &str = "Commands: /clear resets the conversation, /history shows it, /quit exits.\n";

fn render(message: &ChatMessage) -> String {
    match message.role {
        Role::User => format!("🧑‍💻 You: {}\n", message.content),
        Role::Assistant => format!("🤖 Assistant: {}\n", message.content),
        Role::System => format!("⚙️ {}\n", message.content),
    }
}

/// Interactive console. One session lives for the whole loop; each line is one turn.
pub async fn run_repl<R, W>(
    manager: &ConversationManager,
    input: R,
    mut output: W
) -> Result<(), Box<dyn Error + Send + Sync>>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    let mut session = manager.new_session();
    info!("Console session {} started with profile '{}'", session.id(), manager.profile().name);

    output.write_all(HELP.as_bytes()).await?;
    for message in session.messages() {
        output.write_all(render(message).as_bytes()).await?;
    }

    let mut lines = input.lines();
    loop {
        output.write_all(b"> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => output.write_all(HELP.as_bytes()).await?,
            "/clear" => {
                session.clear();
                output.write_all(b"Conversation cleared.\n").await?;
                for message in session.messages() {
                    output.write_all(render(message).as_bytes()).await?;
                }
            }
            "/history" => {
                for message in session.messages() {
                    output.write_all(render(message).as_bytes()).await?;
                }
            }
            text => {
                output.write_all("Thinking... 🤔\n".as_bytes()).await?;
                output.flush().await?;
                match manager.submit(&mut session, text).await {
                    Ok(reply) => {
                        output.write_all(render(&ChatMessage::assistant(reply)).as_bytes()).await?;
                    }
                    Err(e) => {
                        let notice = format!(
                            "⚠️ {}\nPlease try again or rephrase your question.\n",
                            e.user_message()
                        );
                        output.write_all(notice.as_bytes()).await?;
                    }
                }
            }
        }
    }

    output.flush().await?;
    info!("Console session {} ended", session.id());
    Ok(())
}

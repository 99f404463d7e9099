//! Headless host: drives the chat widget from a terminal.
//!
//! Each stdin line is sent as a question. `/clear`, `/toggle` and `/quit`
//! map to the widget's other commands.

use std::sync::Arc;

use chat_widget::api::HttpChatClient;
use chat_widget::config::WidgetConfig;
use chat_widget::controller::WidgetController;
use chat_widget::conversation::Role;
use chat_widget::events::HostEvent;
use chat_widget::position::PositionStore;
use chat_widget::storage::JsonFileStore;
use chat_widget::widget::NotificationLevel;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let config = WidgetConfig::from_env()?;
    let transport = HttpChatClient::new(&config.base_url, config.connect_timeout, config.request_timeout)?;
    tracing::info!(url = transport.url(), theme = %config.theme, "chat endpoint configured");

    let positions = PositionStore::new(JsonFileStore::new(&config.storage_path), config.trigger_size, config.margin);
    let mut widget = WidgetController::mount(positions, Arc::new(transport), config.viewport);
    widget.set_identity(config.user_id.clone());
    widget.set_theme(config.theme);
    widget.toggle_open();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/clear" => widget.clear_conversation(),
            "/toggle" => {
                widget.toggle_open();
                println!("(window {})", if widget.state().is_open() { "open" } else { "closed" });
            }
            text => {
                widget.send_current_input(text);
                if widget.await_response().await {
                    if let Some(reply) = widget.state().conversation().last() {
                        if reply.role == Role::Assistant {
                            println!("assistant> {}", reply.content);
                        }
                    }
                }
            }
        }
        for notice in widget.take_notifications() {
            let tag = match notice.level {
                NotificationLevel::Success => "ok",
                NotificationLevel::Error => "error",
            };
            eprintln!("[{tag}] {}", notice.text);
        }
    }

    widget.handle(HostEvent::Teardown);
    Ok(())
}

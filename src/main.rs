use anyhow::Result;

mod app;
mod client;
mod config;
mod handler;
mod identity;
mod session;
mod tui;
mod ui;

use app::App;
use config::Config;
use tui::{AppEvent, EventHandler};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().unwrap_or_else(|_| Config::new());
    let mut app = App::new(&config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    // One-shot reachability probe for the header; sending is not gated on it
    let health_client = app.client.clone();
    let health_probe = tokio::spawn(async move { health_client.health().await });
    let mut health_probe = Some(health_probe);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if let Some(event) = events.next().await {
            let follow_tail = matches!(event, AppEvent::Tick) && app.conversation.in_flight();
            handler::handle_event(&mut app, event)?;

            // Settle the in-flight send once its task finishes
            app.poll_send_task().await;

            // Keep the typing indicator in view while waiting
            if follow_tail && app.conversation.in_flight() {
                app.scroll_chat_to_bottom();
            }
        } else {
            break;
        }

        if let Some(probe) = &health_probe {
            if probe.is_finished() {
                if let Some(probe) = health_probe.take() {
                    app.backend_online = Some(probe.await.unwrap_or(false));
                }
            }
        }
    }

    tui::restore()?;
    Ok(())
}

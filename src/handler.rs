use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, LoginField, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on any screen
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Login => handle_login_key(app, key),
        Screen::Chat => handle_chat_key(app, key),
    }
}

fn handle_login_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,

        // Enter advances through the form; on the last field it submits
        KeyCode::Enter => {
            if app.login_focus == LoginField::Email {
                app.submit_login();
            } else {
                app.login_focus = app.login_focus.next();
            }
        }

        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = app.login_focus.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = app.login_focus.prev();
        }

        KeyCode::Backspace => app.login_field(app.login_focus).backspace(),
        KeyCode::Delete => app.login_field(app.login_focus).delete(),
        KeyCode::Left => app.login_field(app.login_focus).move_left(),
        KeyCode::Right => app.login_field(app.login_focus).move_right(),
        KeyCode::Home => app.login_field(app.login_focus).move_home(),
        KeyCode::End => app.login_field(app.login_focus).move_end(),
        KeyCode::Char(c) => app.login_field(app.login_focus).insert(c),

        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,

        // Transcript scrolling stays available while waiting for a reply
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::PageUp => app.scroll_page_up(),
        KeyCode::PageDown => app.scroll_page_down(),

        // Input and send are disabled strictly while a request is pending;
        // that disable is the whole concurrency guard
        _ if app.conversation.in_flight() => {}

        KeyCode::Enter => app.send_message(),

        // Input editing
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Char(c) => app.input.insert(c),

        _ => {}
    }
}

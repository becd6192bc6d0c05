use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, LoginField, Screen, TextField};
use crate::session::Role;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Login => render_login_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let backend = match app.backend_online {
        None => Span::styled("backend: checking", Style::default().fg(Color::DarkGray)),
        Some(true) => Span::styled("backend: online", Style::default().fg(Color::Green)),
        Some(false) => Span::styled(
            format!("backend: offline ({})", app.client.base_url()),
            Style::default().fg(Color::Red),
        ),
    };

    let who = app
        .conversation
        .identity()
        .map(|id| format!("  {} ", id.display_name()))
        .unwrap_or_default();

    let title = Line::from(vec![
        Span::styled(" Charla ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        backend,
        Span::styled(who, Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.screen {
        Screen::Login => " Tab/Enter next field · Enter on email to join · Esc quit ",
        Screen::Chat => " Enter send · ↑/↓ PgUp/PgDn scroll · Esc quit ",
    };
    let line = Line::from(vec![
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("· {}", app.conversation.session_id()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Centered login form, the TUI stand-in for the login modal. The chat stays
/// blocked until it is submitted.
fn render_login_screen(app: &App, frame: &mut Frame, area: Rect) {
    let form_area = centered_rect(44, 13, area);
    frame.render_widget(Clear, form_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Who is chatting? ");
    let inner = block.inner(form_area);
    frame.render_widget(block, form_area);

    let [intro_area, first_area, last_area, email_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "All fields optional, anyone may chat.",
            Style::default().fg(Color::DarkGray),
        )),
        intro_area,
    );

    render_login_field(app, frame, first_area, LoginField::FirstName);
    render_login_field(app, frame, last_area, LoginField::LastName);
    render_login_field(app, frame, email_area, LoginField::Email);
}

fn render_login_field(app: &App, frame: &mut Frame, area: Rect, field: LoginField) {
    let focused = app.login_focus == field;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    let value = match field {
        LoginField::FirstName => &app.first_name,
        LoginField::LastName => &app.last_name,
        LoginField::Email => &app.email,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", field.label()));

    render_input_line(frame, area, block, value, focused);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let transcript = app.conversation.transcript();
    let chat_text = if transcript.is_empty() && !app.conversation.in_flight() {
        Text::from(Span::styled(
            "Say hello...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript {
            match msg.role {
                Role::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                Role::Assistant => {
                    lines.push(Line::from(Span::styled(
                        "Assistant:",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(Line::from(line.to_string()));
                    }
                }
                Role::Error => {
                    lines.push(Line::from(Span::styled(
                        "Error:",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(Line::from(Span::styled(
                            line.to_string(),
                            Style::default().fg(Color::Red),
                        )));
                    }
                }
            }
            lines.push(Line::default());
        }

        if app.conversation.in_flight() {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Assistant is typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    // Input box: dimmed and inert while a request is pending
    let in_flight = app.conversation.in_flight();
    let (input_title, input_color) = if in_flight {
        (" Waiting for reply... ", Color::DarkGray)
    } else {
        (" Message (Enter to send) ", Color::Yellow)
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_color))
        .title(input_title);

    render_input_line(frame, input_area, input_block, &app.input, !in_flight);
}

/// Render a single-line input inside `block`, keeping the cursor visible by
/// scrolling the text horizontally, and place the terminal cursor when the
/// field is focused.
fn render_input_line(frame: &mut Frame, area: Rect, block: Block, field: &TextField, focused: bool) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor = field.cursor();

    // Scroll offset that keeps the cursor inside the visible window
    let scroll_offset = if inner_width == 0 || cursor < inner_width {
        0
    } else {
        cursor + 1 - inner_width
    };

    let visible: String = field
        .value()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);

    if focused {
        let x = area.x + 1 + (cursor - scroll_offset) as u16;
        let y = area.y + 1;
        frame.set_cursor_position(Position::new(x, y));
    }
}

/// Fixed-size rect centered in `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_is_centered() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(44, 13, outer);
        assert_eq!(inner.width, 44);
        assert_eq!(inner.height, 13);
        assert_eq!(inner.x, 28);
        assert_eq!(inner.y, 13);
    }

    #[test]
    fn test_centered_rect_clamps_to_small_areas() {
        let outer = Rect::new(0, 0, 20, 5);
        let inner = centered_rect(44, 13, outer);
        assert!(inner.width <= outer.width);
        assert!(inner.height <= outer.height);
    }
}

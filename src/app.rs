use tokio::task::JoinHandle;

use crate::client::ChatClient;
use crate::config::{self, Config};
use crate::session::{Conversation, TurnOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    FirstName,
    LastName,
    Email,
}

impl LoginField {
    pub fn next(self) -> Self {
        match self {
            LoginField::FirstName => LoginField::LastName,
            LoginField::LastName => LoginField::Email,
            LoginField::Email => LoginField::FirstName,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            LoginField::FirstName => LoginField::Email,
            LoginField::LastName => LoginField::FirstName,
            LoginField::Email => LoginField::LastName,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoginField::FirstName => "First name",
            LoginField::LastName => "Last name",
            LoginField::Email => "Email",
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// A single-line text input with a character-based cursor. Backs the three
/// login fields and the chat input box.
#[derive(Debug, Default, Clone)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.value.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,

    // Login form state
    pub login_focus: LoginField,
    pub first_name: TextField,
    pub last_name: TextField,
    pub email: TextField,

    // Chat state
    pub input: TextField,
    pub conversation: Conversation,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend
    pub client: ChatClient,
    pub backend_online: Option<bool>, // None until the startup probe settles
    pub send_task: Option<JoinHandle<TurnOutcome>>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            screen: Screen::Login,

            login_focus: LoginField::FirstName,
            first_name: TextField::default(),
            last_name: TextField::default(),
            email: TextField::default(),

            input: TextField::default(),
            conversation: Conversation::new(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            client: ChatClient::new(&config.server_url()),
            backend_online: None,
            send_task: None,
        }
    }

    pub fn login_field(&mut self, field: LoginField) -> &mut TextField {
        match field {
            LoginField::FirstName => &mut self.first_name,
            LoginField::LastName => &mut self.last_name,
            LoginField::Email => &mut self.email,
        }
    }

    /// Submit the login form: store the identity, cache it best-effort, and
    /// unblock the chat screen. One-way, there is no way back to the form.
    pub fn submit_login(&mut self) {
        let identity = self.conversation.submit_identity(
            self.first_name.value(),
            self.last_name.value(),
            self.email.value(),
        );
        let _ = config::cache_identity(identity);
        self.screen = Screen::Chat;
    }

    /// Start a send for the current input. No-ops when the input is blank,
    /// when no identity was submitted, or while a request is still pending.
    pub fn send_message(&mut self) {
        if self.send_task.is_some() {
            return;
        }
        let Some(text) = self.conversation.begin_turn(self.input.value()) else {
            return;
        };
        self.input.clear();
        let Some(identity) = self.conversation.identity().cloned() else {
            return;
        };

        let client = self.client.clone();
        self.send_task = Some(tokio::spawn(async move {
            client.send_message(&identity, &text).await
        }));
        self.scroll_chat_to_bottom();
    }

    /// Settle the in-flight send if it has finished. Called from the run
    /// loop on every event, including ticks.
    pub async fn poll_send_task(&mut self) {
        let finished = self
            .send_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.send_task.take() {
            // A panicked send task settles like a transport failure
            let outcome = task.await.unwrap_or(TurnOutcome::Unreachable);
            self.conversation.finish_turn(outcome);
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.conversation.in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_page_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(self.chat_height.max(1) / 2);
    }

    pub fn scroll_page_down(&mut self) {
        self.chat_scroll = self
            .chat_scroll
            .saturating_add(self.chat_height.max(1) / 2);
    }

    /// Scroll the transcript so the newest entry (or the typing indicator)
    /// is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.conversation.transcript() {
            total_lines += 1; // Role line ("You:" / "Assistant:" / "Error:")
            for line in msg.content.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1; // Empty line still takes one line
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.conversation.in_flight() {
            total_lines += 1; // "Assistant is typing..." indicator
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_to_byte_index_ascii() {
        assert_eq!(char_to_byte_index("hello", 0), 0);
        assert_eq!(char_to_byte_index("hello", 3), 3);
        assert_eq!(char_to_byte_index("hello", 99), 5);
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        // 'ñ' is two bytes in UTF-8
        assert_eq!(char_to_byte_index("mañana", 3), 4);
    }

    #[test]
    fn test_text_field_insert_and_cursor() {
        let mut field = TextField::default();
        for c in "hola".chars() {
            field.insert(c);
        }
        assert_eq!(field.value(), "hola");
        assert_eq!(field.cursor(), 4);

        field.move_home();
        field.insert('¡');
        assert_eq!(field.value(), "¡hola");
        assert_eq!(field.cursor(), 1);
    }

    #[test]
    fn test_text_field_backspace_mid_word() {
        let mut field = TextField::default();
        for c in "chat".chars() {
            field.insert(c);
        }
        field.move_left();
        field.backspace();
        assert_eq!(field.value(), "cht");
        assert_eq!(field.cursor(), 2);
    }

    #[test]
    fn test_text_field_delete_at_cursor() {
        let mut field = TextField::default();
        for c in "año".chars() {
            field.insert(c);
        }
        field.move_home();
        field.move_right();
        field.delete();
        assert_eq!(field.value(), "ao");
        assert_eq!(field.cursor(), 1);
    }

    #[test]
    fn test_text_field_cursor_clamps() {
        let mut field = TextField::default();
        field.move_left();
        assert_eq!(field.cursor(), 0);
        field.insert('a');
        field.move_right();
        field.move_right();
        assert_eq!(field.cursor(), 1);
    }

    #[test]
    fn test_login_field_cycling() {
        assert_eq!(LoginField::FirstName.next(), LoginField::LastName);
        assert_eq!(LoginField::LastName.next(), LoginField::Email);
        assert_eq!(LoginField::Email.next(), LoginField::FirstName);
        assert_eq!(LoginField::FirstName.prev(), LoginField::Email);
    }

    #[test]
    fn test_submit_login_unlocks_chat() {
        let mut app = App::new(&Config::new());
        assert_eq!(app.screen, Screen::Login);
        app.submit_login();
        assert_eq!(app.screen, Screen::Chat);
        assert!(app.conversation.identity().is_some());
    }
}

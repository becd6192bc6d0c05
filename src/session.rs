use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

pub const SERVER_ERROR_FALLBACK: &str = "Something went wrong on the server.";
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Is the backend running? Make sure to run python run.py";

/// A chat message in the conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    Error,
}

/// How a single send settled: the server replied, the server reported a
/// failure (with an optional detail string), or no response was obtained
/// at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Reply(String),
    ServerError(Option<String>),
    Unreachable,
}

impl TurnOutcome {
    /// Convert a settled outcome into the transcript entry it renders as.
    pub fn into_message(self) -> Message {
        match self {
            TurnOutcome::Reply(text) => Message {
                role: Role::Assistant,
                content: text,
            },
            TurnOutcome::ServerError(detail) => Message {
                role: Role::Error,
                content: detail.unwrap_or_else(|| SERVER_ERROR_FALLBACK.to_string()),
            },
            TurnOutcome::Unreachable => Message {
                role: Role::Error,
                content: NETWORK_ERROR_MESSAGE.to_string(),
            },
        }
    }
}

/// One conversation with the assistant backend.
///
/// Owns the identity, the opaque session token and the append-only
/// transcript. Messages are only ever appended, in send/receive order; the
/// typing indicator is UI state and never enters the transcript.
pub struct Conversation {
    identity: Option<Identity>,
    session_id: String,
    transcript: Vec<Message>,
    in_flight: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            identity: None,
            session_id: generate_session_id(),
            transcript: Vec::new(),
            in_flight: false,
        }
    }

    /// Store the identity captured from the login form. One-way: once
    /// submitted the conversation stays unlocked, there is no logout.
    pub fn submit_identity(&mut self, first_name: &str, last_name: &str, email: &str) -> &Identity {
        self.identity.insert(Identity::new(first_name, last_name, email))
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Opaque token generated once per run. Currently held in state but not
    /// sent with requests, matching the observed wire contract.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// True strictly between `begin_turn` and `finish_turn`. The UI disables
    /// input while this holds; that disable is the only guard against
    /// overlapping sends.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a turn: append the user message and mark the request in flight.
    ///
    /// Returns the trimmed text to send, or `None` when the turn is a silent
    /// no-op (empty text, no identity yet, or a send already in flight).
    pub fn begin_turn(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() || self.identity.is_none() || self.in_flight {
            return None;
        }

        self.transcript.push(Message {
            role: Role::User,
            content: text.to_string(),
        });
        self.in_flight = true;
        Some(text.to_string())
    }

    /// Settle a turn: append the assistant or error message and re-enable
    /// sending. Every outcome is terminal for that turn only.
    pub fn finish_turn(&mut self, outcome: TurnOutcome) {
        self.transcript.push(outcome.into_message());
        self.in_flight = false;
    }
}

/// Opaque per-run session token, e.g. `session-x7k2m9qp1`.
fn generate_session_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();
    format!("session-{}", suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> Conversation {
        let mut convo = Conversation::new();
        convo.submit_identity("Ada", "Lovelace", "ada@example.com");
        convo
    }

    #[test]
    fn test_completed_turn_appends_exactly_two_messages() {
        let mut convo = logged_in();
        let sent = convo.begin_turn("hello there").unwrap();
        assert_eq!(sent, "hello there");
        assert_eq!(convo.transcript().len(), 1);
        assert_eq!(convo.transcript()[0].role, Role::User);

        convo.finish_turn(TurnOutcome::Reply("hi".to_string()));
        assert_eq!(convo.transcript().len(), 2);
        assert_eq!(convo.transcript()[1].role, Role::Assistant);
    }

    #[test]
    fn test_empty_text_is_a_no_op() {
        let mut convo = logged_in();
        assert!(convo.begin_turn("").is_none());
        assert!(convo.begin_turn("   \t  ").is_none());
        assert!(convo.transcript().is_empty());
        assert!(!convo.in_flight());
    }

    #[test]
    fn test_no_identity_is_a_no_op() {
        let mut convo = Conversation::new();
        assert!(convo.begin_turn("hello").is_none());
        assert!(convo.transcript().is_empty());
    }

    #[test]
    fn test_in_flight_blocks_a_second_turn() {
        let mut convo = logged_in();
        assert!(convo.begin_turn("first").is_some());
        assert!(convo.in_flight());
        assert!(convo.begin_turn("second").is_none());
        assert_eq!(convo.transcript().len(), 1);

        convo.finish_turn(TurnOutcome::Reply("ok".to_string()));
        assert!(!convo.in_flight());
        assert!(convo.begin_turn("second").is_some());
    }

    #[test]
    fn test_begin_turn_trims_text() {
        let mut convo = logged_in();
        let sent = convo.begin_turn("  hello  ").unwrap();
        assert_eq!(sent, "hello");
        assert_eq!(convo.transcript()[0].content, "hello");
    }

    #[test]
    fn test_empty_identity_still_unlocks_sending() {
        let mut convo = Conversation::new();
        convo.submit_identity("", "", "");
        assert!(convo.identity().is_some());
        assert!(convo.begin_turn("hello").is_some());
    }

    #[test]
    fn test_reply_outcome_renders_as_assistant() {
        let msg = TurnOutcome::Reply("Hello".to_string()).into_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_server_detail_renders_verbatim() {
        let msg = TurnOutcome::ServerError(Some("rate limited".to_string())).into_message();
        assert_eq!(msg.role, Role::Error);
        assert_eq!(msg.content, "rate limited");
    }

    #[test]
    fn test_server_error_without_detail_uses_fallback() {
        let msg = TurnOutcome::ServerError(None).into_message();
        assert_eq!(msg.role, Role::Error);
        assert_eq!(msg.content, SERVER_ERROR_FALLBACK);
    }

    #[test]
    fn test_unreachable_renders_network_message() {
        let msg = TurnOutcome::Unreachable.into_message();
        assert_eq!(msg.role, Role::Error);
        assert_eq!(msg.content, NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_transcript_preserves_send_receive_order() {
        let mut convo = logged_in();
        convo.begin_turn("one").unwrap();
        convo.finish_turn(TurnOutcome::Reply("r1".to_string()));
        convo.begin_turn("two").unwrap();
        convo.finish_turn(TurnOutcome::ServerError(None));

        let contents: Vec<&str> = convo.transcript().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "r1", "two", SERVER_ERROR_FALLBACK]);
    }

    #[test]
    fn test_session_id_shape() {
        let convo = Conversation::new();
        let id = convo.session_id();
        assert!(id.starts_with("session-"));
        assert_eq!(id.len(), "session-".len() + 9);
    }
}

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::session::TurnOutcome;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Serialize)]
struct ChatRequest {
    message: String,
    first_name: String,
    last_name: String,
    email: String,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

#[derive(Deserialize)]
struct ChatFailure {
    detail: Option<String>,
}

/// HTTP client for the chat backend. One `POST /chat` per turn, no retry,
/// no timeout: while a request is pending the UI keeps input disabled.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one message and settle it into a `TurnOutcome`. Transport and
    /// decode failures are absorbed here; nothing propagates past a turn.
    pub async fn send_message(&self, identity: &Identity, text: &str) -> TurnOutcome {
        match self.post_chat(identity, text).await {
            Ok(outcome) => outcome,
            Err(_) => TurnOutcome::Unreachable,
        }
    }

    async fn post_chat(&self, identity: &Identity, text: &str) -> Result<TurnOutcome> {
        let request = ChatRequest {
            message: text.to_string(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            email: identity.email.clone(),
        };

        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let success = response.status().is_success();
        let body = response.text().await?;
        Ok(interpret_response(success, &body))
    }

    /// Probe `GET /health`. Informational only: the header shows whether the
    /// backend answered at startup, sending is never gated on it.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

/// Map a received response to its outcome: 2xx bodies carry `{ response }`,
/// failure bodies optionally carry `{ detail }`. A 2xx body that does not
/// parse counts as unreachable, the same as never hearing back.
fn interpret_response(success: bool, body: &str) -> TurnOutcome {
    if success {
        match serde_json::from_str::<ChatReply>(body) {
            Ok(reply) => TurnOutcome::Reply(reply.response),
            Err(_) => TurnOutcome::Unreachable,
        }
    } else {
        let detail = serde_json::from_str::<ChatFailure>(body)
            .ok()
            .and_then(|f| f.detail);
        TurnOutcome::ServerError(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body_becomes_reply() {
        let outcome = interpret_response(true, r#"{"response":"Hello"}"#);
        assert_eq!(outcome, TurnOutcome::Reply("Hello".to_string()));
    }

    #[test]
    fn test_failure_body_carries_detail() {
        let outcome = interpret_response(false, r#"{"detail":"rate limited"}"#);
        assert_eq!(outcome, TurnOutcome::ServerError(Some("rate limited".to_string())));
    }

    #[test]
    fn test_failure_body_without_detail() {
        let outcome = interpret_response(false, r#"{}"#);
        assert_eq!(outcome, TurnOutcome::ServerError(None));
    }

    #[test]
    fn test_failure_body_that_is_not_json() {
        let outcome = interpret_response(false, "Internal Server Error");
        assert_eq!(outcome, TurnOutcome::ServerError(None));
    }

    #[test]
    fn test_garbled_success_body_counts_as_unreachable() {
        let outcome = interpret_response(true, "not json");
        assert_eq!(outcome, TurnOutcome::Unreachable);
    }

    #[test]
    fn test_base_url_trailing_slash_is_stripped() {
        let client = ChatClient::new("http://127.0.0.1:8000/");
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
    }
}

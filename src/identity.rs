use serde::{Deserialize, Serialize};

/// The user's display identity, captured once per session from the login
/// form. Fields are trimmed but otherwise unvalidated: empty names and a
/// malformed email are accepted, anyone may chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Identity {
    pub fn new(first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: email.trim().to_string(),
        }
    }

    /// Name shown in the header once logged in. Falls back to the email,
    /// then to a placeholder, since every field may be empty.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if !self.email.is_empty() {
            self.email.clone()
        } else {
            "anonymous".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_trims_fields() {
        let id = Identity::new("  Ada ", " Lovelace\t", " ada@example.com ");
        assert_eq!(id.first_name, "Ada");
        assert_eq!(id.last_name, "Lovelace");
        assert_eq!(id.email, "ada@example.com");
    }

    #[test]
    fn test_identity_accepts_empty_fields() {
        let id = Identity::new("", "   ", "");
        assert_eq!(id.first_name, "");
        assert_eq!(id.last_name, "");
        assert_eq!(id.email, "");
    }

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(Identity::new("Ada", "Lovelace", "").display_name(), "Ada Lovelace");
        assert_eq!(Identity::new("Ada", "", "").display_name(), "Ada");
        assert_eq!(Identity::new("", "", "ada@example.com").display_name(), "ada@example.com");
        assert_eq!(Identity::new("", "", "").display_name(), "anonymous");
    }
}

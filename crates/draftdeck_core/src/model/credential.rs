//! Bearer credential and resolved identity.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Identity returned by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl Identity {
    /// Name to greet the user with: full name when set, email otherwise.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.email.as_str())
    }
}

/// Opaque bearer token plus the identity it resolved to.
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub identity: Option<Identity>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            identity: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.identity.is_some()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Credential, Identity};

    #[test]
    fn debug_output_redacts_token() {
        let credential = Credential::new("secret-token-value");
        let printed = format!("{credential:?}");
        assert!(!printed.contains("secret-token-value"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut identity = Identity {
            id: Some(1),
            email: "ana@example.com".to_string(),
            full_name: Some("  ".to_string()),
        };
        assert_eq!(identity.display_name(), "ana@example.com");
        identity.full_name = Some("Ana Ruiz".to_string());
        assert_eq!(identity.display_name(), "Ana Ruiz");
    }
}

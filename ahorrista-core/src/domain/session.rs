//! Session and credential models

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// An authenticated identity and its bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub token: String,
}

impl Session {
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            token: token.into(),
        }
    }

    /// A session only counts when it carries a non-blank token
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

/// Login/registration request body
///
/// The backend names the password field `passwd`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "passwd")]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response from `/authentication/login` and `/authentication/register`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: String,
    /// Whatever identity fields the backend sends alongside the token
    #[serde(flatten)]
    pub identity: Map<String, JsonValue>,
}

impl AuthResponse {
    /// Email reported by the backend, if any
    pub fn email(&self) -> Option<&str> {
        self.identity.get("email").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_wire_format() {
        let creds = Credentials::new("ana@example.com", "s3cret");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["passwd"], "s3cret");
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::new("ana@example.com", "s3cret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_auth_response_keeps_identity_fields() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"token":"abc","email":"ana@example.com","id":7}"#).unwrap();
        assert_eq!(resp.token, "abc");
        assert_eq!(resp.email(), Some("ana@example.com"));
        assert_eq!(resp.identity.get("id"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn test_blank_token_is_not_a_session() {
        assert!(!Session::new("ana@example.com", "  ").has_token());
        assert!(Session::new("ana@example.com", "abc").has_token());
    }
}

//! Authenticated user and token session.

use serde::{Deserialize, Serialize};

/// The signed-in user as reported by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A token session issued by the auth service.
///
/// The serialized form is what gets persisted on the device between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds at issue time.
    pub expires_in: i64,
    /// Unix timestamp (seconds) at which the access token expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Whether the access token has expired at `now_unix` (seconds).
    ///
    /// Sessions without an absolute expiry are treated as still valid.
    pub fn is_expired(&self, now_unix: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_unix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at,
            user: AuthUser {
                id: "u1".into(),
                email: Some("ana@example.com".into()),
            },
        }
    }

    #[test]
    fn expiry_is_inclusive() {
        assert!(session(Some(100)).is_expired(100));
        assert!(!session(Some(100)).is_expired(99));
    }

    #[test]
    fn no_expiry_never_expires() {
        assert!(!session(None).is_expired(i64::MAX));
    }

    #[test]
    fn token_type_defaults_when_absent() {
        let s: Session = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","expires_in":60,"user":{"id":"u1"}}"#,
        )
        .unwrap();
        assert_eq!(s.token_type, "bearer");
        assert_eq!(s.user.email, None);
    }
}

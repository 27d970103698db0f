//! Auth service request and response bodies.

use perspecto_db::models::{AuthUser, Session};
use serde::{Deserialize, Serialize};

/// Path prefix of the auth service.
pub const AUTH_PATH: &str = "/auth/v1";

/// Grant type for an email/password exchange.
pub const GRANT_PASSWORD: &str = "password";
/// Grant type for a refresh-token exchange.
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// Token endpoint for `grant_type`.
pub fn token_url(base_url: &str, grant_type: &str) -> String {
    format!("{base_url}{AUTH_PATH}/token?grant_type={grant_type}")
}

pub fn logout_url(base_url: &str) -> String {
    format!("{base_url}{AUTH_PATH}/logout")
}

pub fn user_url(base_url: &str) -> String {
    format!("{base_url}{AUTH_PATH}/user")
}

#[derive(Debug, Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UpdateUser<'a> {
    pub password: &'a str,
}

/// Body returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

impl TokenResponse {
    /// Convert into a [`Session`], deriving the absolute expiry from
    /// `expires_in` when the service omitted it.
    pub fn into_session(self, now_unix: i64) -> Session {
        Session {
            expires_at: Some(self.expires_at.unwrap_or(now_unix + self.expires_in)),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in: self.expires_in,
            user: self.user,
        }
    }
}

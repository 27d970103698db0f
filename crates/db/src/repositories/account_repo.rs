//! Session and credential operations against the auth service.

use std::sync::Arc;

use perspecto_core::credentials;

use crate::backend::{require_user, Backend};
use crate::error::DataResult;
use crate::models::{AuthUser, Session};

/// Sign-in, sign-out and password changes.
#[derive(Clone)]
pub struct AccountRepo {
    backend: Arc<dyn Backend>,
}

impl AccountRepo {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.backend.current_user()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.backend.current_session()
    }

    /// Sign in with an email/password pair.
    ///
    /// Obviously malformed input is rejected before any remote call.
    pub async fn sign_in(&self, email: &str, password: &str) -> DataResult<Session> {
        credentials::validate_sign_in(email, password)?;
        let session = self
            .backend
            .sign_in_with_password(email.trim(), password)
            .await?;
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    pub async fn sign_out(&self) -> DataResult<()> {
        self.backend.sign_out().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Replace the signed-in user's password.
    pub async fn update_password(&self, password: &str) -> DataResult<AuthUser> {
        credentials::validate_new_password(password)?;
        let user = require_user(self.backend.as_ref())?;
        let updated = self.backend.update_password(password).await?;
        tracing::info!(user_id = %user.id, "Password updated");
        Ok(updated)
    }
}

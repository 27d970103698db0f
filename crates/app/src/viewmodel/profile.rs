//! Profile screen: account email, password change and sign-out.

use std::sync::Arc;

use perspecto_db::repositories::AccountRepo;
use tokio::sync::watch;

use super::error_message;

#[derive(Debug, Clone, Default)]
pub struct ProfileState {
    pub email: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub update_success: bool,
}

/// State holder for the profile screen.
#[derive(Clone)]
pub struct ProfileViewModel {
    account: AccountRepo,
    state: Arc<watch::Sender<ProfileState>>,
}

impl ProfileViewModel {
    /// Reads the signed-in user's email immediately.
    pub fn new(account: AccountRepo) -> Self {
        let email = account.current_user().and_then(|u| u.email);
        let (state, _) = watch::channel(ProfileState {
            email,
            ..ProfileState::default()
        });
        Self {
            account,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProfileState {
        self.state.borrow().clone()
    }

    pub async fn update_password(&self, password: &str) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
            s.update_success = false;
        });

        let result = self.account.update_password(password).await;

        self.state.send_modify(|s| {
            match result {
                Ok(_) => s.update_success = true,
                Err(e) => {
                    tracing::warn!(error = %e, "Password update failed");
                    s.error = Some(error_message(&e, "Failed to update password"));
                }
            }
            s.is_loading = false;
        });
    }

    /// End the session. The local session is gone even if the backend
    /// call fails; the failure is still shown.
    pub async fn sign_out(&self) {
        if let Err(e) = self.account.sign_out().await {
            tracing::warn!(error = %e, "Sign-out failed");
            self.state
                .send_modify(|s| s.error = Some(error_message(&e, "Failed to sign out")));
        }
    }

    /// Clear the error and success flags after the UI has shown them.
    pub fn reset_state(&self) {
        self.state.send_modify(|s| {
            s.error = None;
            s.update_success = false;
        });
    }
}

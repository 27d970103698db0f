//! App entry routing and the sign-in screen, including the optional
//! biometric unlock enrollment that follows a first password sign-in.
//!
//! The biometric prompt itself is platform code; its result is fed in as a
//! [`BiometricOutcome`].

use std::sync::Arc;

use perspecto_core::text::is_blank;
use perspecto_db::repositories::AccountRepo;
use tokio::sync::watch;

use crate::prefs::Preferences;

/// Where the app opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartDestination {
    /// No session: show the sign-in screen.
    Auth,
    /// A session exists and biometric unlock is on: prompt first.
    BiometricGate,
    /// A session exists and no prompt is needed.
    Main,
}

/// Result of a platform biometric prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricOutcome {
    Success,
    /// The user's biometric did not match.
    Failed,
    /// The prompt reported an error (including user cancellation).
    Error(String),
    HardwareUnavailable,
    FeatureUnavailable,
    /// The device has no biometric or credential enrolled.
    NotEnrolled,
}

/// What the sign-in screen should do after a successful sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    /// Continue to the main screen.
    Done,
    /// Ask whether to enable biometric unlock before continuing.
    OfferBiometric,
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub is_loading: bool,
    pub error: Option<String>,
    /// The "enable biometric login?" question is on screen.
    pub biometric_offer_pending: bool,
    /// The user accepted the offer and the enrollment prompt is showing.
    pub enrolling: bool,
}

/// State holder for app entry and sign-in.
#[derive(Clone)]
pub struct AuthViewModel {
    account: AccountRepo,
    prefs: Preferences,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthViewModel {
    pub fn new(account: AccountRepo, prefs: Preferences) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            account,
            prefs,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    // ---- entry ----

    pub fn start_destination(&self) -> StartDestination {
        if self.account.current_session().is_none() {
            StartDestination::Auth
        } else if self.prefs.biometric_enabled() {
            StartDestination::BiometricGate
        } else {
            StartDestination::Main
        }
    }

    /// Route after the unlock prompt shown by [`StartDestination::BiometricGate`].
    pub fn on_gate_result(&self, outcome: &BiometricOutcome) -> StartDestination {
        match outcome {
            BiometricOutcome::Success => StartDestination::Main,
            other => {
                tracing::info!(outcome = ?other, "Biometric unlock not completed");
                StartDestination::Auth
            }
        }
    }

    // ---- sign-in ----

    /// Sign in with email and password.
    ///
    /// Returns `None` on failure, with the message in [`AuthState::error`].
    pub async fn sign_in(&self, email: &str, password: &str) -> Option<SignInOutcome> {
        if is_blank(email) || is_blank(password) {
            self.state
                .send_modify(|s| s.error = Some("Please fill in all fields".to_string()));
            return None;
        }

        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let result = self.account.sign_in(email, password).await;

        let mut outcome = None;
        self.state.send_modify(|s| {
            match &result {
                Ok(_) if self.prefs.biometric_enabled() => outcome = Some(SignInOutcome::Done),
                Ok(_) => {
                    s.biometric_offer_pending = true;
                    outcome = Some(SignInOutcome::OfferBiometric);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Sign-in failed");
                    s.error = Some(format!("Error: {e}"));
                }
            }
            s.is_loading = false;
        });
        outcome
    }

    // ---- biometric enrollment ----

    /// The user accepted the offer; the platform prompt is about to show.
    pub fn accept_biometric(&self) {
        self.state.send_modify(|s| {
            s.biometric_offer_pending = false;
            s.enrolling = true;
        });
    }

    pub fn decline_biometric(&self) {
        self.state.send_modify(|s| {
            s.biometric_offer_pending = false;
            s.enrolling = false;
        });
    }

    /// Outcome of the enrollment prompt. Returns whether biometric unlock
    /// is now on.
    pub fn on_biometric_result(&self, outcome: &BiometricOutcome) -> bool {
        if !self.state.borrow().enrolling {
            return false;
        }

        if *outcome != BiometricOutcome::Success {
            tracing::info!(outcome = ?outcome, "Biometric enrollment not completed");
            self.state.send_modify(|s| s.enrolling = false);
            return false;
        }

        let saved = self.prefs.set_biometric_enabled(true);
        if let Err(e) = &saved {
            tracing::warn!(error = %e, "Failed to save biometric preference");
        }
        self.state.send_modify(|s| {
            s.enrolling = false;
            if let Err(e) = &saved {
                s.error = Some(e.to_string());
            }
        });
        saved.is_ok()
    }
}

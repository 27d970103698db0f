//! View-state holders, one per screen.
//!
//! Each holder keeps its screen state in a [`tokio::sync::watch`] channel:
//! UIs call `subscribe()` and re-render on change, or read `snapshot()`.
//! Every mutation recomputes the derived display state before publishing,
//! so subscribers never observe raw inputs and derived output out of step.
//!
//! Holders are cheap to clone; clones share the same state, which lets a
//! [`ScreenScope`](crate::scope::ScreenScope) run their async operations.

pub mod annotations;
pub mod auth;
pub mod player;
pub mod profile;
pub mod upload;
pub mod video_list;

pub use annotations::{AnnotationsState, AnnotationsViewModel};
pub use auth::{AuthState, AuthViewModel, BiometricOutcome, SignInOutcome, StartDestination};
pub use player::{PlayerState, VideoPlayerViewModel};
pub use profile::{ProfileState, ProfileViewModel};
pub use upload::{UploadState, UploadViewModel};
pub use video_list::{VideoListState, VideoListViewModel};

use perspecto_db::DataError;
use tokio::sync::watch;

/// Display text for `err`, or `fallback` when the error renders empty.
pub(crate) fn error_message(err: &DataError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Clears in-flight flags if the operation holding it is dropped before it
/// finishes, e.g. when its [`ScreenScope`](crate::scope::ScreenScope) closes.
pub(crate) struct InFlight<'a, S> {
    state: &'a watch::Sender<S>,
    reset: Option<fn(&mut S)>,
}

impl<'a, S> InFlight<'a, S> {
    pub(crate) fn new(state: &'a watch::Sender<S>, reset: fn(&mut S)) -> Self {
        Self {
            state,
            reset: Some(reset),
        }
    }

    /// The operation completed and set its own flags.
    pub(crate) fn finish(mut self) {
        self.reset = None;
    }
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if let Some(reset) = self.reset.take() {
            tracing::debug!("Screen operation cancelled, clearing in-flight flags");
            self.state.send_modify(reset);
        }
    }
}

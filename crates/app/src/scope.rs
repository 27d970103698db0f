//! Screen-lifetime task scope.
//!
//! Work launched from a screen (fetches, deletes) is tied to that screen.
//! Closing or dropping the [`ScreenScope`] cancels whatever is still in
//! flight; results that arrive afterwards are never applied.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Owns the cancellation token for one screen's background work.
#[derive(Debug, Default)]
pub struct ScreenScope {
    cancel: CancellationToken,
}

impl ScreenScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `fut`, racing it against the scope's cancellation.
    ///
    /// The handle yields `Some(output)` when the future finished and
    /// `None` when the scope was closed first.
    pub fn launch<F>(&self, fut: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Screen task cancelled");
                    None
                }
                output = fut => Some(output),
            }
        })
    }

    /// Cancel everything launched from this scope.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A child token, cancelled together with this scope.
    pub fn token(&self) -> CancellationToken {
        self.cancel.child_token()
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

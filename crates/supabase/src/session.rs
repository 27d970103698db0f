//! Persistence hook for the token session.

use perspecto_db::models::Session;

/// Somewhere to keep the session between application runs.
///
/// Implementations report their own I/O failures; a store that cannot read
/// its blob behaves as if no session was saved.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

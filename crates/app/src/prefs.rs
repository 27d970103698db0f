//! On-device preference files.
//!
//! Two JSON documents live in the data directory:
//!
//! - `user_prefs.json`: `{"biometric_enabled": bool}`
//! - `supabase_session.json`: `{"session": <serialized session>}`
//!
//! A missing or corrupt file reads as defaults (biometrics off, no session).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use perspecto_db::models::Session;
use perspecto_supabase::SessionStore;
use serde::{Deserialize, Serialize};

const USER_PREFS_FILE: &str = "user_prefs.json";
const SESSION_FILE: &str = "supabase_session.json";

/// Errors writing preference files.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserPrefs {
    #[serde(default)]
    biometric_enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    session: Session,
}

// ---------------------------------------------------------------------------
// Shared file helpers
// ---------------------------------------------------------------------------

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Option<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read preference file");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt preference file");
            None
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PrefsError> {
    let io_err = |source| PrefsError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body).map_err(io_err)
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// User-facing preferences.
#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
}

impl Preferences {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(USER_PREFS_FILE),
        }
    }

    /// Whether the user opted into biometric unlock.
    pub fn biometric_enabled(&self) -> bool {
        read_json::<UserPrefs>(&self.path).is_some_and(|p| p.biometric_enabled)
    }

    pub fn set_biometric_enabled(&self, enabled: bool) -> Result<(), PrefsError> {
        let mut prefs = read_json::<UserPrefs>(&self.path).unwrap_or_default();
        prefs.biometric_enabled = enabled;
        write_json(&self.path, &prefs)?;
        tracing::info!(enabled, "Biometric preference saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// [`SessionStore`] backed by `supabase_session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        read_json::<StoredSession>(&self.path).map(|s| s.session)
    }

    fn save(&self, session: &Session) {
        let stored = StoredSession {
            session: session.clone(),
        };
        if let Err(e) = write_json(&self.path, &stored) {
            tracing::warn!(error = %e, "Failed to persist session");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, "Failed to remove stored session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perspecto_db::models::AuthUser;

    fn session() -> Session {
        Session {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: Some(1_700_000_000),
            user: AuthUser {
                id: "u1".into(),
                email: Some("ana@example.com".into()),
            },
        }
    }

    #[test]
    fn biometric_defaults_to_off() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!Preferences::new(dir.path()).biometric_enabled());
    }

    #[test]
    fn biometric_flag_persists() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::new(dir.path());
        prefs.set_biometric_enabled(true).unwrap();
        assert!(Preferences::new(dir.path()).biometric_enabled());

        let raw = fs::read_to_string(dir.path().join("user_prefs.json")).unwrap();
        assert!(raw.contains("\"biometric_enabled\": true"));
    }

    #[test]
    fn data_dir_created_on_first_write() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        Preferences::new(&nested).set_biometric_enabled(false).unwrap();
        assert!(nested.join("user_prefs.json").exists());
    }

    #[test]
    fn session_round_trips_under_session_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&session());

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("supabase_session.json")).unwrap())
                .unwrap();
        assert_eq!(raw["session"]["access_token"], "at");
        assert_eq!(store.load(), Some(session()));
    }

    #[test]
    fn corrupt_session_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("supabase_session.json"), "{not json").unwrap();
        assert_eq!(FileSessionStore::new(dir.path()).load(), None);
    }

    #[test]
    fn clear_removes_session_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.clear();
        store.save(&session());
        store.clear();
        assert_eq!(store.load(), None);
    }
}

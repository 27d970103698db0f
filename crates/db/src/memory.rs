//! In-process [`Backend`] used by tests and offline demos.
//!
//! Tables are vectors of JSON rows filtered with the same [`Query`]
//! semantics the remote service applies. Every remote-shaped call is
//! recorded, can be delayed by a configurable latency, and can be made to
//! fail per table (or for `"storage"` / `"auth"`).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::backend::{Backend, Query};
use crate::error::{DataError, DataResult};
use crate::models::{AuthUser, Session};

/// Failure target for storage calls.
pub const STORAGE: &str = "storage";
/// Failure target for auth calls.
pub const AUTH: &str = "auth";

const SESSION_LIFETIME_SECS: i64 = 3600;

#[derive(Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    /// Keyed by `<bucket>/<path>`.
    objects: BTreeMap<String, Vec<u8>>,
    /// Registered accounts: user plus password.
    accounts: Vec<(AuthUser, String)>,
    session: Option<Session>,
    failing: HashSet<String>,
    calls: Vec<String>,
    latency: Option<Duration>,
}

/// A [`Backend`] held entirely in memory.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with `user_id` already signed in.
    pub fn with_user(user_id: &str) -> Self {
        let backend = Self::new();
        backend.sign_in_as(AuthUser {
            id: user_id.to_string(),
            email: Some(format!("{user_id}@example.com")),
        });
        backend
    }

    /// Register an account that can sign in with `email` / `password`.
    pub fn register_account(&self, user_id: &str, email: &str, password: &str) -> AuthUser {
        let user = AuthUser {
            id: user_id.to_string(),
            email: Some(email.to_string()),
        };
        self.lock()
            .accounts
            .push((user.clone(), password.to_string()));
        user
    }

    /// Install a session for `user` without going through sign-in.
    pub fn sign_in_as(&self, user: AuthUser) {
        self.lock().session = Some(issue_session(user));
    }

    /// Append rows to `table`.
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// Snapshot of every row in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Paths of the objects stored in `bucket`, sorted.
    pub fn object_paths(&self, bucket: &str) -> Vec<String> {
        let prefix = format!("{bucket}/");
        self.lock()
            .objects
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    /// Make every call against `target` (a table name, [`STORAGE`] or
    /// [`AUTH`]) fail with a 500. A recorded call name such as
    /// `"delete annotations"` fails only that operation.
    pub fn fail(&self, target: &str) {
        self.lock().failing.insert(target.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Delay every remote-shaped call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// Recorded calls, e.g. `"select videos"`, `"count annotations"`.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    // ---- private helpers ----

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A panic while holding the lock only happens inside a failing test.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call, apply latency and the failure switch for `target`.
    async fn enter(&self, op: &str, target: &str) -> DataResult<()> {
        let call = format!("{op} {target}");
        let latency = {
            let mut state = self.lock();
            state.calls.push(call.clone());
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failing = {
            let state = self.lock();
            state.failing.contains(target) || state.failing.contains(&call)
        };
        if failing {
            return Err(DataError::Remote {
                status: 500,
                message: format!("Simulated failure on {target}"),
            });
        }
        Ok(())
    }
}

fn issue_session(user: AuthUser) -> Session {
    Session {
        access_token: perspecto_core::ids::new_record_id(),
        refresh_token: perspecto_core::ids::new_record_id(),
        token_type: "bearer".to_string(),
        expires_in: SESSION_LIFETIME_SECS,
        expires_at: Some(chrono::Utc::now().timestamp() + SESSION_LIFETIME_SECS),
        user,
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> DataResult<Vec<Value>> {
        self.enter("select", table).await?;
        let state = self.lock();
        Ok(state
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn count(&self, table: &str, query: &Query) -> DataResult<u64> {
        self.enter("count", table).await?;
        let state = self.lock();
        let n = state
            .tables
            .get(table)
            .map_or(0, |rows| rows.iter().filter(|r| query.matches(r)).count());
        Ok(n as u64)
    }

    async fn insert(&self, table: &str, mut row: Value) -> DataResult<()> {
        self.enter("insert", table).await?;
        if let Value::Object(fields) = &mut row {
            fields
                .entry("id")
                .or_insert_with(|| Value::String(perspecto_core::ids::new_record_id()));
        }
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    async fn update(&self, table: &str, patch: Value, query: &Query) -> DataResult<()> {
        self.enter("update", table).await?;
        let Value::Object(patch) = patch else {
            return Err(DataError::Remote {
                status: 400,
                message: "Patch must be a JSON object".to_string(),
            });
        };
        let mut state = self.lock();
        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                if let Value::Object(fields) = row {
                    for (k, v) in &patch {
                        fields.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: &str, query: &Query) -> DataResult<()> {
        self.enter("delete", table).await?;
        let mut state = self.lock();
        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|r| !query.matches(r));
        }
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        upsert: bool,
    ) -> DataResult<()> {
        self.enter("upload", STORAGE).await?;
        let key = format!("{bucket}/{path}");
        let mut state = self.lock();
        if !upsert && state.objects.contains_key(&key) {
            return Err(DataError::Remote {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        state.objects.insert(key, bytes);
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://storage/v1/object/public/{bucket}/{path}")
    }

    async fn remove_objects(&self, bucket: &str, paths: &[String]) -> DataResult<()> {
        self.enter("remove", STORAGE).await?;
        let mut state = self.lock();
        for path in paths {
            state.objects.remove(&format!("{bucket}/{path}"));
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.lock().session.as_ref().map(|s| s.user.clone())
    }

    fn current_session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> DataResult<Session> {
        self.enter("sign_in", AUTH).await?;
        let mut state = self.lock();
        let user = state
            .accounts
            .iter()
            .find(|(user, pw)| user.email.as_deref() == Some(email) && pw == password)
            .map(|(user, _)| user.clone())
            .ok_or_else(|| DataError::Remote {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;
        let session = issue_session(user);
        state.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> DataResult<()> {
        let result = self.enter("sign_out", AUTH).await;
        self.lock().session = None;
        result
    }

    async fn update_password(&self, password: &str) -> DataResult<AuthUser> {
        self.enter("update_password", AUTH).await?;
        let mut state = self.lock();
        let user = state
            .session
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(DataError::NotAuthenticated)?;
        for (account, pw) in state.accounts.iter_mut() {
            if account.id == user.id {
                *pw = password.to_string();
            }
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_missing_id() {
        let backend = MemoryBackend::new();
        backend.insert("videos", json!({"title": "Intro"})).await.unwrap();
        let rows = backend.rows("videos");
        assert!(rows[0]["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn update_merges_patch_into_matching_rows() {
        let backend = MemoryBackend::new();
        backend.seed(
            "videos",
            [
                json!({"id": "v1", "isPublic": false}),
                json!({"id": "v2", "isPublic": false}),
            ],
        );
        backend
            .update("videos", json!({"isPublic": true}), &Query::new().eq("id", "v1"))
            .await
            .unwrap();
        let rows = backend.rows("videos");
        assert_eq!(rows[0]["isPublic"], true);
        assert_eq!(rows[1]["isPublic"], false);
    }

    #[tokio::test]
    async fn failing_table_returns_remote_error() {
        let backend = MemoryBackend::new();
        backend.fail("folders");
        let err = backend.select("folders", &Query::new()).await.unwrap_err();
        assert_matches!(err, DataError::Remote { status: 500, .. });
        backend.clear_failures();
        assert!(backend.select("folders", &Query::new()).await.is_ok());
    }

    #[tokio::test]
    async fn failure_can_target_one_operation() {
        let backend = MemoryBackend::new();
        backend.fail("delete folders");
        assert!(backend.select("folders", &Query::new()).await.is_ok());
        let err = backend.delete("folders", &Query::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Simulated failure on folders");
    }

    #[tokio::test]
    async fn upload_without_upsert_refuses_overwrite() {
        let backend = MemoryBackend::new();
        backend.upload("videos", "u1/a.mp4", vec![1], "video/mp4", false).await.unwrap();
        let err = backend
            .upload("videos", "u1/a.mp4", vec![2], "video/mp4", false)
            .await
            .unwrap_err();
        assert_matches!(err, DataError::Remote { status: 409, .. });
        assert_eq!(backend.object_paths("videos"), vec!["u1/a.mp4".to_string()]);
    }

    #[tokio::test]
    async fn sign_in_checks_registered_password() {
        let backend = MemoryBackend::new();
        backend.register_account("u1", "ana@example.com", "secret");
        let err = backend
            .sign_in_with_password("ana@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        let session = backend
            .sign_in_with_password("ana@example.com", "secret")
            .await
            .unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(backend.current_user().map(|u| u.id), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn calls_are_recorded_in_order() {
        let backend = MemoryBackend::with_user("u1");
        backend.select("videos", &Query::new()).await.unwrap();
        backend.count("annotations", &Query::new()).await.unwrap();
        assert_eq!(backend.calls(), vec!["select videos", "count annotations"]);
    }
}

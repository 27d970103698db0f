//! [`SupabaseClient`]: the HTTP [`Backend`].

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use perspecto_db::backend::{Backend, Query};
use perspecto_db::models::{AuthUser, Session};
use perspecto_db::{DataError, DataResult};
use serde_json::Value;

use crate::auth::{self, PasswordGrant, RefreshGrant, TokenResponse, UpdateUser};
use crate::http::{check_status, ensure_success, parse_response, transport};
use crate::postgrest;
use crate::session::SessionStore;
use crate::storage;

/// HTTP client for one Supabase project.
///
/// Requests carry the project's anon key as `apikey` and the session's
/// access token (or the anon key when signed out) as the bearer token.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    store: Option<Arc<dyn SessionStore>>,
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`.
    ///
    /// * `timeout` - Applied to every request, body included.
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> DataResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport)?;
        Ok(Self::with_client(http, base_url, anon_key))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, base_url: &str, anon_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            session: RwLock::new(None),
            store: None,
        }
    }

    /// Persist sessions through `store`.
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Load the persisted session, refreshing it when it has expired.
    ///
    /// A refresh the service rejects clears the stored session and
    /// returns `None`; transport failures propagate so an offline start
    /// does not sign the user out.
    pub async fn restore_session(&self) -> DataResult<Option<Session>> {
        let Some(stored) = self.store.as_ref().and_then(|s| s.load()) else {
            return Ok(None);
        };
        if !stored.is_expired(now_unix()) {
            self.install_session(Some(stored.clone()));
            tracing::info!(user_id = %stored.user.id, "Session restored");
            return Ok(Some(stored));
        }
        match self.refresh_with(&stored.refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(DataError::Remote { status, message }) => {
                tracing::warn!(status, %message, "Stored session could not be refreshed");
                self.install_session(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Exchange the current refresh token for a new session.
    pub async fn refresh_session(&self) -> DataResult<Session> {
        let refresh_token = self
            .current_session()
            .map(|s| s.refresh_token)
            .ok_or(DataError::NotAuthenticated)?;
        self.refresh_with(&refresh_token).await
    }

    // ---- private helpers ----

    async fn refresh_with(&self, refresh_token: &str) -> DataResult<Session> {
        let response = self
            .http
            .post(auth::token_url(&self.base_url, auth::GRANT_REFRESH_TOKEN))
            .header("apikey", &self.anon_key)
            .json(&RefreshGrant { refresh_token })
            .send()
            .await
            .map_err(transport)?;
        let token: TokenResponse = parse_response(response, "token").await?;
        let session = token.into_session(now_unix());
        self.install_session(Some(session.clone()));
        tracing::info!(user_id = %session.user.id, "Session refreshed");
        Ok(session)
    }

    /// Replace the in-memory session and mirror it to the store.
    fn install_session(&self, session: Option<Session>) {
        if let Some(store) = &self.store {
            match &session {
                Some(s) => store.save(s),
                None => store.clear(),
            }
        }
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
    }

    fn bearer(&self) -> String {
        self.current_session()
            .map_or_else(|| self.anon_key.clone(), |s| s.access_token)
    }

    /// Attach `apikey` and bearer headers.
    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }
}

fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn select(&self, table: &str, query: &Query) -> DataResult<Vec<Value>> {
        let response = self
            .authorized(self.http.get(postgrest::table_url(&self.base_url, table)))
            .query(&postgrest::select_params(query))
            .send()
            .await
            .map_err(transport)?;
        parse_response(response, table).await
    }

    async fn count(&self, table: &str, query: &Query) -> DataResult<u64> {
        let response = self
            .authorized(self.http.head(postgrest::table_url(&self.base_url, table)))
            .header("Prefer", "count=exact")
            .query(&postgrest::select_params(query))
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;
        let total = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(postgrest::parse_content_range_total);
        Ok(total.unwrap_or(0))
    }

    async fn insert(&self, table: &str, row: Value) -> DataResult<()> {
        let response = self
            .authorized(self.http.post(postgrest::table_url(&self.base_url, table)))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await
    }

    async fn update(&self, table: &str, patch: Value, query: &Query) -> DataResult<()> {
        let response = self
            .authorized(self.http.patch(postgrest::table_url(&self.base_url, table)))
            .header("Prefer", "return=minimal")
            .query(&postgrest::filter_params(query))
            .json(&patch)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await
    }

    async fn delete(&self, table: &str, query: &Query) -> DataResult<()> {
        let response = self
            .authorized(self.http.delete(postgrest::table_url(&self.base_url, table)))
            .query(&postgrest::filter_params(query))
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await
    }

    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> DataResult<()> {
        let size = bytes.len();
        let response = self
            .authorized(self.http.post(storage::object_url(&self.base_url, bucket, path)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;
        tracing::debug!(bucket, path, size, "Object uploaded");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        storage::public_url(&self.base_url, bucket, path)
    }

    async fn remove_objects(&self, bucket: &str, paths: &[String]) -> DataResult<()> {
        let response = self
            .authorized(self.http.delete(storage::bucket_url(&self.base_url, bucket)))
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.current_session().map(|s| s.user)
    }

    fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> DataResult<Session> {
        let response = self
            .http
            .post(auth::token_url(&self.base_url, auth::GRANT_PASSWORD))
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .send()
            .await
            .map_err(transport)?;
        let token: TokenResponse = parse_response(response, "token").await?;
        let session = token.into_session(now_unix());
        self.install_session(Some(session.clone()));
        Ok(session)
    }

    /// Revoke the session remotely. The local session is dropped even when
    /// the remote call fails.
    async fn sign_out(&self) -> DataResult<()> {
        if self.current_session().is_none() {
            return Ok(());
        }
        let result = self
            .authorized(self.http.post(auth::logout_url(&self.base_url)))
            .send()
            .await
            .map_err(transport);
        self.install_session(None);
        check_status(result?).await
    }

    async fn update_password(&self, password: &str) -> DataResult<AuthUser> {
        let mut session = self.current_session().ok_or(DataError::NotAuthenticated)?;
        let response = self
            .authorized(self.http.put(auth::user_url(&self.base_url)))
            .json(&UpdateUser { password })
            .send()
            .await
            .map_err(transport)?;
        let user: AuthUser = parse_response(response, "user").await?;
        session.user = user.clone();
        self.install_session(Some(session));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Option<Session>>,
    }

    impl SessionStore for RecordingStore {
        fn load(&self) -> Option<Session> {
            self.saved.lock().unwrap().clone()
        }
        fn save(&self, session: &Session) {
            *self.saved.lock().unwrap() = Some(session.clone());
        }
        fn clear(&self) {
            *self.saved.lock().unwrap() = None;
        }
    }

    fn session(expires_at: i64) -> Session {
        Session {
            access_token: "at".into(),
            refresh_token: "rt".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: Some(expires_at),
            user: AuthUser {
                id: "u1".into(),
                email: None,
            },
        }
    }

    fn client() -> SupabaseClient {
        SupabaseClient::new("https://p.supabase.co/", "anon", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        assert_eq!(client().base_url(), "https://p.supabase.co");
    }

    #[test]
    fn bearer_falls_back_to_anon_key() {
        let client = client();
        assert_eq!(client.bearer(), "anon");
        client.install_session(Some(session(i64::MAX)));
        assert_eq!(client.bearer(), "at");
    }

    #[test]
    fn public_url_uses_project_base() {
        assert_eq!(
            client().public_url("videos", "u1/v1.mp4"),
            "https://p.supabase.co/storage/v1/object/public/videos/u1/v1.mp4"
        );
    }

    #[tokio::test]
    async fn unexpired_stored_session_restored_without_network() {
        let store = Arc::new(RecordingStore::default());
        store.save(&session(i64::MAX));
        let client = client().with_session_store(store);

        let restored = client.restore_session().await.unwrap();
        assert_eq!(restored.map(|s| s.user.id), Some("u1".to_string()));
        assert_eq!(client.current_user().map(|u| u.id), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn nothing_stored_restores_nothing() {
        let client = client().with_session_store(Arc::new(RecordingStore::default()));
        assert!(client.restore_session().await.unwrap().is_none());
        assert!(client.current_user().is_none());
    }

    #[tokio::test]
    async fn update_password_without_session_is_rejected() {
        let err = client().update_password("new-secret").await.unwrap_err();
        assert_matches!(err, DataError::NotAuthenticated);
    }

    #[tokio::test]
    async fn sign_out_without_session_is_a_noop() {
        assert!(client().sign_out().await.is_ok());
    }
}

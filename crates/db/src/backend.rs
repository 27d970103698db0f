//! The seam between repositories and the hosted backend.
//!
//! [`Backend`] groups the three remote services the client relies on:
//! row queries against named tables, object storage, and session-based
//! authentication. Rows cross the seam as [`serde_json::Value`] so that a
//! backend implementation never needs to know the models; [`select_as`] and
//! [`to_row`] do the typed conversion on the repository side.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DataError, DataResult};
use crate::models::session::{AuthUser, Session};

/// Remote table names.
pub mod tables {
    pub const VIDEOS: &str = "videos";
    pub const ANNOTATIONS: &str = "annotations";
    pub const ANNOTATION_COMMENTS: &str = "annotation_comments";
    pub const FOLDERS: &str = "folders";
    pub const PROJECT_FOLDERS: &str = "project_folders";
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A single row filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`
    Eq { column: String, value: String },
    /// `column IN (values...)`
    In { column: String, values: Vec<String> },
}

impl Filter {
    /// Column the filter applies to.
    pub fn column(&self) -> &str {
        match self {
            Self::Eq { column, .. } | Self::In { column, .. } => column,
        }
    }

    /// Evaluate the filter against a JSON row.
    ///
    /// Values compare by their text form; a missing or `null` column never
    /// matches, mirroring SQL equality.
    pub fn matches(&self, row: &Value) -> bool {
        let Some(cell) = row.get(self.column()).and_then(cell_text) else {
            return false;
        };
        match self {
            Self::Eq { value, .. } => &cell == value,
            Self::In { values, .. } => values.iter().any(|v| v == &cell),
        }
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Conjunction of row filters, built fluently.
///
/// ```
/// use perspecto_db::Query;
///
/// let q = Query::new().eq("ownerId", "u1").is_in("annotationId", ["a1", "a2"]);
/// assert_eq!(q.filters().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
}

impl Query {
    /// A query matching every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Add a membership filter.
    pub fn is_in<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Whether every filter accepts `row`.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Remote services used by the repositories.
///
/// Implementations must be cheap to share (`Arc<dyn Backend>`); session
/// state lives inside the implementation.
#[async_trait]
pub trait Backend: Send + Sync {
    // ---- tables ----

    /// Fetch every row of `table` matching `query`.
    async fn select(&self, table: &str, query: &Query) -> DataResult<Vec<Value>>;

    /// Exact number of rows of `table` matching `query`.
    async fn count(&self, table: &str, query: &Query) -> DataResult<u64>;

    /// Insert one row.
    async fn insert(&self, table: &str, row: Value) -> DataResult<()>;

    /// Apply the fields of `patch` to every matching row.
    async fn update(&self, table: &str, patch: Value, query: &Query) -> DataResult<()>;

    /// Delete every matching row.
    async fn delete(&self, table: &str, query: &Query) -> DataResult<()>;

    // ---- storage ----

    /// Store `bytes` at `path` inside `bucket`.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> DataResult<()>;

    /// Public URL of an object. Pure string construction, no remote call.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Delete objects by path.
    async fn remove_objects(&self, bucket: &str, paths: &[String]) -> DataResult<()>;

    // ---- auth ----

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// The current token session, if any.
    fn current_session(&self) -> Option<Session>;

    /// Exchange an email/password pair for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> DataResult<Session>;

    /// End the current session. The local session is dropped even when
    /// the remote call fails.
    async fn sign_out(&self) -> DataResult<()>;

    /// Change the signed-in user's password.
    async fn update_password(&self, password: &str) -> DataResult<AuthUser>;
}

// ---------------------------------------------------------------------------
// Typed helpers
// ---------------------------------------------------------------------------

/// Select rows and decode them into `T`.
pub async fn select_as<T: DeserializeOwned>(
    backend: &dyn Backend,
    table: &str,
    query: &Query,
) -> DataResult<Vec<T>> {
    let rows = backend.select(table, query).await?;
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|source| DataError::Decode {
                table: table.to_string(),
                source,
            })
        })
        .collect()
}

/// Encode a model into a JSON row for `table`.
pub fn to_row<T: Serialize>(table: &str, value: &T) -> DataResult<Value> {
    serde_json::to_value(value).map_err(|source| DataError::Encode {
        table: table.to_string(),
        source,
    })
}

/// The signed-in user, or [`DataError::NotAuthenticated`].
pub fn require_user(backend: &dyn Backend) -> DataResult<AuthUser> {
    backend.current_user().ok_or(DataError::NotAuthenticated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

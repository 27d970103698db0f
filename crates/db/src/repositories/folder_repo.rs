//! Repository for the `folders` and `project_folders` tables.

use std::sync::Arc;

use crate::backend::{require_user, select_as, tables, Backend, Query};
use crate::error::DataResult;
use crate::models::{Folder, FolderMembership};

/// Read access to the folder tree and folder memberships.
#[derive(Clone)]
pub struct FolderRepo {
    backend: Arc<dyn Backend>,
}

impl FolderRepo {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// All folders owned by the signed-in user.
    pub async fn list_for_current_user(&self) -> DataResult<Vec<Folder>> {
        let user = require_user(self.backend.as_ref())?;
        let folders: Vec<Folder> = select_as(
            self.backend.as_ref(),
            tables::FOLDERS,
            &Query::new().eq("owner_id", &user.id),
        )
        .await?;
        tracing::debug!(user_id = %user.id, count = folders.len(), "Fetched folders");
        Ok(folders)
    }

    /// Every folder membership visible to the caller.
    ///
    /// No filter is applied; row-level security on the backend scopes the
    /// result to the caller's rows.
    pub async fn list_memberships(&self) -> DataResult<Vec<FolderMembership>> {
        let memberships: Vec<FolderMembership> =
            select_as(self.backend.as_ref(), tables::PROJECT_FOLDERS, &Query::new()).await?;
        tracing::debug!(count = memberships.len(), "Fetched folder memberships");
        Ok(memberships)
    }
}

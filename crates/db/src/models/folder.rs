//! Folder tree and folder-membership models.

use perspecto_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A row from the `folders` table. `parent_id` links folders into a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<RecordId>,
    pub owner_id: RecordId,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, with = "super::lenient_timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(default, with = "super::lenient_timestamp")]
    pub updated_at: Option<Timestamp>,
}

/// A row from the `project_folders` junction table: video `project_id`
/// filed under `folder_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderMembership {
    pub project_id: RecordId,
    pub folder_id: RecordId,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default, with = "super::lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

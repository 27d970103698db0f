//! Video row model and write DTOs for the `videos` table.

use perspecto_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// A row from the `videos` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(default)]
    pub id: RecordId,
    /// Id used in the storage path at upload time.
    pub video_id: String,
    pub title: String,
    pub url: String,
    /// Legacy display name; the title takes precedence.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<RecordId>,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default, with = "super::lenient_timestamp")]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub allow_annotations: bool,
    /// Computed client-side from the `annotations` table; never stored.
    #[serde(skip)]
    pub annotation_count: u64,
}

impl Video {
    /// Title for screen headers: the title, else the legacy name.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

/// Row inserted after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub owner_id: RecordId,
    pub title: String,
    pub url: String,
    pub video_id: String,
    pub file_path: String,
    pub duration: f64,
    pub total_frames: i64,
    pub video_type: String,
    pub file_size: i64,
}

/// Patch toggling a video's sharing flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoSharing {
    pub is_public: bool,
    pub allow_annotations: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_minimal_row_with_defaults() {
        let v: Video = serde_json::from_value(json!({
            "videoId": "vid",
            "title": "Intro",
            "url": "https://h/videos/u/vid.mp4"
        }))
        .unwrap();
        assert_eq!(v.id, "");
        assert_eq!(v.file_size, None);
        assert!(!v.is_public);
        assert_eq!(v.annotation_count, 0);
    }

    #[test]
    fn ignores_unknown_columns_and_stored_count() {
        let v: Video = serde_json::from_value(json!({
            "id": "v1",
            "videoId": "vid",
            "title": "Intro",
            "url": "u",
            "filePath": "u/vid.mp4",
            "annotationCount": 42,
            "updatedAt": "2024-05-01T10:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(v.annotation_count, 0);
        assert!(v.updated_at.is_some());
    }

    #[test]
    fn display_title_falls_back_to_name() {
        let mut v: Video = serde_json::from_value(json!({
            "videoId": "vid", "title": "", "url": "u", "name": "u/vid.mp4"
        }))
        .unwrap();
        assert_eq!(v.display_title(), "u/vid.mp4");
        v.title = "Intro".into();
        assert_eq!(v.display_title(), "Intro");
    }

    #[test]
    fn sharing_patch_uses_camel_case() {
        let patch = serde_json::to_value(UpdateVideoSharing {
            is_public: true,
            allow_annotations: false,
        })
        .unwrap();
        assert_eq!(patch, json!({"isPublic": true, "allowAnnotations": false}));
    }
}

//! Annotation and comment models for the `annotations` and
//! `annotation_comments` tables.

use perspecto_core::types::{RecordId, Timestamp};
use serde::{Deserialize, Serialize};

/// Colour tag written when none is chosen.
pub const DEFAULT_ANNOTATION_COLOR: &str = "#FFFFFF";

/// Annotation type written when none is chosen.
pub const DEFAULT_ANNOTATION_TYPE: &str = "text";

fn default_color() -> String {
    DEFAULT_ANNOTATION_COLOR.to_string()
}

fn default_annotation_type() -> String {
    DEFAULT_ANNOTATION_TYPE.to_string()
}

/* --------------------------------------------------------------------------
   Annotations
   -------------------------------------------------------------------------- */

/// A row from the `annotations` table plus its client-side comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: RecordId,
    #[serde(default)]
    pub video_id: Option<RecordId>,
    pub user_id: RecordId,
    pub content: String,
    /// Display label, e.g. `"High Priority"`.
    pub title: String,
    pub severity: String,
    /// Playback position in seconds.
    pub timestamp: f64,
    #[serde(default)]
    pub start_frame: Option<i32>,
    #[serde(default)]
    pub end_frame: Option<i32>,
    #[serde(default)]
    pub frame: Option<i32>,
    #[serde(default)]
    pub project_id: Option<RecordId>,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub duration_frames: i32,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_annotation_type")]
    pub annotation_type: String,
    /// Attached after fetching `annotation_comments`; never stored.
    #[serde(skip)]
    pub comments: Vec<Comment>,
}

/// Row inserted for a new annotation. `user_id` is stamped by the
/// repository from the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnotation {
    pub id: RecordId,
    pub video_id: Option<RecordId>,
    pub user_id: RecordId,
    pub content: String,
    pub title: String,
    pub severity: String,
    pub timestamp: f64,
    pub start_frame: Option<i32>,
    pub end_frame: Option<i32>,
    pub frame: Option<i32>,
    pub project_id: Option<RecordId>,
    pub duration: f64,
    pub duration_frames: i32,
    pub color: String,
    pub annotation_type: String,
}

impl NewAnnotation {
    /// A text annotation at a single point of `video_id`.
    ///
    /// Start, end and anchor frame all take `frame`; the owning user is
    /// left empty for the repository to fill in.
    pub fn point(
        id: RecordId,
        video_id: &str,
        content: String,
        severity: perspecto_core::severity::Severity,
        timestamp: f64,
        frame: Option<i32>,
    ) -> Self {
        Self {
            id,
            video_id: Some(video_id.to_string()),
            user_id: String::new(),
            content,
            title: severity.title(),
            severity: severity.as_str().to_string(),
            timestamp,
            start_frame: frame,
            end_frame: frame,
            frame,
            project_id: Some(video_id.to_string()),
            duration: 0.0,
            duration_frames: 0,
            color: default_color(),
            annotation_type: default_annotation_type(),
        }
    }
}

/* --------------------------------------------------------------------------
   Comments
   -------------------------------------------------------------------------- */

/// A row from the `annotation_comments` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: RecordId,
    pub annotation_id: RecordId,
    pub content: String,
    #[serde(default, with = "super::lenient_timestamp")]
    pub created_at: Option<Timestamp>,
}

/// Row inserted for a new comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub id: RecordId,
    pub annotation_id: RecordId,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use perspecto_core::severity::Severity;
    use serde_json::json;

    #[test]
    fn decodes_row_with_defaults() {
        let a: Annotation = serde_json::from_value(json!({
            "id": "a1",
            "userId": "u1",
            "content": "Jump cut",
            "title": "High Priority",
            "severity": "high",
            "timestamp": 12.5
        }))
        .unwrap();
        assert_eq!(a.video_id, None);
        assert_eq!(a.color, DEFAULT_ANNOTATION_COLOR);
        assert_eq!(a.annotation_type, DEFAULT_ANNOTATION_TYPE);
        assert!(a.comments.is_empty());
    }

    #[test]
    fn point_annotation_fills_frames_and_labels() {
        let a = NewAnnotation::point(
            "a1".into(),
            "v1",
            "Audio drops".into(),
            Severity::Medium,
            3.0,
            Some(90),
        );
        assert_eq!(a.title, "Medium Priority");
        assert_eq!(a.severity, "medium");
        assert_eq!(a.start_frame, Some(90));
        assert_eq!(a.end_frame, Some(90));
        assert_eq!(a.frame, Some(90));
        assert_eq!(a.project_id.as_deref(), Some("v1"));
    }

    #[test]
    fn new_annotation_serializes_camel_case_without_comments() {
        let a = NewAnnotation::point("a1".into(), "v1", "x".into(), Severity::Low, 0.0, None);
        let row = serde_json::to_value(&a).unwrap();
        assert_eq!(row["videoId"], "v1");
        assert_eq!(row["annotationType"], "text");
        assert!(row.get("comments").is_none());
    }
}

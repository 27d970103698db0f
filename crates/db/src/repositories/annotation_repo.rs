//! Repository for the `annotations` and `annotation_comments` tables.
//!
//! Annotations are fetched first; their comments are then fetched in a
//! single batch keyed by every loaded annotation id and attached
//! client-side. A failed comment batch degrades to empty threads instead of
//! failing the whole listing.

use std::collections::HashMap;
use std::sync::Arc;

use perspecto_core::ids;

use crate::backend::{require_user, select_as, tables, to_row, Backend, Query};
use crate::error::DataResult;
use crate::models::{Annotation, Comment, NewAnnotation, NewComment};

/// Annotation listing, creation and deletion, plus comment threads.
#[derive(Clone)]
pub struct AnnotationRepo {
    backend: Arc<dyn Backend>,
}

impl AnnotationRepo {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// All annotations on a video, with comments attached.
    ///
    /// A malformed video id matches nothing and returns an empty list
    /// without contacting the backend.
    pub async fn list_for_video(&self, video_id: &str) -> DataResult<Vec<Annotation>> {
        if !ids::is_valid_uuid(video_id) {
            tracing::debug!(video_id, "Skipping annotation fetch for malformed video id");
            return Ok(Vec::new());
        }
        let annotations: Vec<Annotation> = select_as(
            self.backend.as_ref(),
            tables::ANNOTATIONS,
            &Query::new().eq("videoId", video_id),
        )
        .await?;
        Ok(self.attach_comments(annotations).await)
    }

    /// All annotations authored by the signed-in user, with comments.
    pub async fn list_for_current_user(&self) -> DataResult<Vec<Annotation>> {
        let user = require_user(self.backend.as_ref())?;
        let annotations: Vec<Annotation> = select_as(
            self.backend.as_ref(),
            tables::ANNOTATIONS,
            &Query::new().eq("userId", &user.id),
        )
        .await?;
        tracing::debug!(user_id = %user.id, count = annotations.len(), "Fetched annotations");
        Ok(self.attach_comments(annotations).await)
    }

    /// Insert an annotation owned by the signed-in user.
    pub async fn create(&self, draft: &NewAnnotation) -> DataResult<()> {
        let user = require_user(self.backend.as_ref())?;
        let row = NewAnnotation {
            user_id: user.id,
            ..draft.clone()
        };
        self.backend
            .insert(tables::ANNOTATIONS, to_row(tables::ANNOTATIONS, &row)?)
            .await?;
        tracing::info!(annotation_id = %row.id, video_id = ?row.video_id, "Annotation created");
        Ok(())
    }

    /// Delete one of the signed-in user's annotations.
    pub async fn delete(&self, annotation_id: &str) -> DataResult<()> {
        let user = require_user(self.backend.as_ref())?;
        self.backend
            .delete(
                tables::ANNOTATIONS,
                &Query::new().eq("id", annotation_id).eq("userId", &user.id),
            )
            .await?;
        tracing::info!(annotation_id, "Annotation deleted");
        Ok(())
    }

    /// Append a comment to an annotation's thread.
    pub async fn add_comment(&self, annotation_id: &str, content: &str) -> DataResult<Comment> {
        require_user(self.backend.as_ref())?;
        let row = NewComment {
            id: ids::new_record_id(),
            annotation_id: annotation_id.to_string(),
            content: content.to_string(),
        };
        self.backend
            .insert(
                tables::ANNOTATION_COMMENTS,
                to_row(tables::ANNOTATION_COMMENTS, &row)?,
            )
            .await?;
        tracing::info!(annotation_id, comment_id = %row.id, "Comment added");
        Ok(Comment {
            id: row.id,
            annotation_id: row.annotation_id,
            content: row.content,
            created_at: None,
        })
    }

    // ---- private helpers ----

    /// Fetch the comment batch for `annotations` and attach it.
    async fn attach_comments(&self, annotations: Vec<Annotation>) -> Vec<Annotation> {
        if annotations.is_empty() {
            return annotations;
        }
        let annotation_ids: Vec<&str> = annotations.iter().map(|a| a.id.as_str()).collect();
        let query = Query::new().is_in("annotationId", annotation_ids);
        let comments: Vec<Comment> =
            match select_as(self.backend.as_ref(), tables::ANNOTATION_COMMENTS, &query).await {
                Ok(comments) => comments,
                Err(e) => {
                    tracing::warn!(error = %e, "Comment fetch failed, continuing without comments");
                    Vec::new()
                }
            };
        merge_comments(annotations, comments)
    }
}

/// Attach to each annotation exactly the comments whose `annotation_id`
/// equals its id, keeping the comments' fetch order. Comments referencing
/// no annotation in the batch are dropped.
pub fn merge_comments(annotations: Vec<Annotation>, comments: Vec<Comment>) -> Vec<Annotation> {
    let mut by_annotation: HashMap<String, Vec<Comment>> = HashMap::new();
    for comment in comments {
        by_annotation
            .entry(comment.annotation_id.clone())
            .or_default()
            .push(comment);
    }
    annotations
        .into_iter()
        .map(|mut annotation| {
            annotation.comments = by_annotation.get(&annotation.id).cloned().unwrap_or_default();
            annotation
        })
        .collect()
}

//! Repository for the `videos` table and the video storage bucket.

use std::sync::Arc;

use futures::future::try_join_all;
use perspecto_core::error::CoreError;
use perspecto_core::ids;
use perspecto_core::media::MediaInfo;
use perspecto_core::storage::{
    object_path_from_public_url, video_object_path, DEFAULT_VIDEO_BUCKET, VIDEO_CONTENT_TYPE,
};

use crate::backend::{require_user, select_as, tables, to_row, Backend, Query};
use crate::error::DataResult;
use crate::models::{NewVideo, UpdateVideoSharing, Video};

/// `videoType` written for files uploaded from the device.
pub const UPLOAD_VIDEO_TYPE: &str = "upload";

/// Video listing, upload, sharing and deletion for the signed-in user.
#[derive(Clone)]
pub struct VideoRepo {
    backend: Arc<dyn Backend>,
    bucket: String,
}

impl VideoRepo {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_bucket(backend, DEFAULT_VIDEO_BUCKET)
    }

    pub fn with_bucket(backend: Arc<dyn Backend>, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
        }
    }

    /// All videos owned by the signed-in user, each with its annotation count.
    ///
    /// Counts are one exact-count request per video, issued concurrently.
    pub async fn list_for_current_user(&self) -> DataResult<Vec<Video>> {
        let user = require_user(self.backend.as_ref())?;
        let videos: Vec<Video> = select_as(
            self.backend.as_ref(),
            tables::VIDEOS,
            &Query::new().eq("ownerId", &user.id),
        )
        .await?;

        let counts = try_join_all(videos.iter().map(|v| self.annotation_count(&v.id))).await?;
        let videos: Vec<Video> = videos
            .into_iter()
            .zip(counts)
            .map(|(video, annotation_count)| Video {
                annotation_count,
                ..video
            })
            .collect();

        tracing::debug!(user_id = %user.id, count = videos.len(), "Fetched videos");
        Ok(videos)
    }

    /// One of the signed-in user's videos, with its annotation count.
    ///
    /// A malformed id cannot name any video and is reported as not found
    /// without contacting the backend.
    pub async fn find_for_current_user(&self, id: &str) -> DataResult<Video> {
        let user = require_user(self.backend.as_ref())?;
        if !ids::is_valid_uuid(id) {
            tracing::debug!(video_id = id, "Skipping video lookup for malformed id");
            return Err(CoreError::NotFound {
                entity: "Video",
                id: id.to_string(),
            }
            .into());
        }
        let video = select_as::<Video>(
            self.backend.as_ref(),
            tables::VIDEOS,
            &Query::new().eq("id", id).eq("ownerId", &user.id),
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::NotFound {
            entity: "Video",
            id: id.to_string(),
        })?;
        let annotation_count = self.annotation_count(&video.id).await?;
        Ok(Video {
            annotation_count,
            ..video
        })
    }

    /// Upload a video file and insert its row.
    ///
    /// The object is stored at `<user>/<new id>.mp4` without overwriting;
    /// the row points at its public URL. Returns the inserted row.
    pub async fn upload(&self, title: &str, bytes: Vec<u8>, media: MediaInfo) -> DataResult<NewVideo> {
        let user = require_user(self.backend.as_ref())?;
        let video_id = ids::new_record_id();
        let path = video_object_path(&user.id, &video_id);
        let file_size = i64::try_from(bytes.len()).unwrap_or(i64::MAX);

        self.backend
            .upload(&self.bucket, &path, bytes, VIDEO_CONTENT_TYPE, false)
            .await?;
        let url = self.backend.public_url(&self.bucket, &path);

        let row = NewVideo {
            owner_id: user.id.clone(),
            title: title.to_string(),
            url,
            video_id,
            file_path: path,
            duration: media.duration_secs(),
            total_frames: media.total_frames(),
            video_type: UPLOAD_VIDEO_TYPE.to_string(),
            file_size,
        };
        self.backend
            .insert(tables::VIDEOS, to_row(tables::VIDEOS, &row)?)
            .await?;
        tracing::info!(
            user_id = %user.id,
            video_id = %row.video_id,
            file_size,
            "Video uploaded"
        );
        Ok(row)
    }

    /// Set both sharing flags on one of the signed-in user's videos.
    pub async fn update_sharing(
        &self,
        id: &str,
        is_public: bool,
        allow_annotations: bool,
    ) -> DataResult<()> {
        let user = require_user(self.backend.as_ref())?;
        let patch = UpdateVideoSharing {
            is_public,
            allow_annotations,
        };
        self.backend
            .update(
                tables::VIDEOS,
                to_row(tables::VIDEOS, &patch)?,
                &Query::new().eq("id", id).eq("ownerId", &user.id),
            )
            .await?;
        tracing::info!(video_id = id, is_public, allow_annotations, "Video sharing updated");
        Ok(())
    }

    /// Delete a video: its annotations, its row, then its stored file.
    ///
    /// Only the row deletion can fail the call. Annotation cleanup and
    /// object removal are best effort.
    pub async fn delete(&self, id: &str, url: &str) -> DataResult<()> {
        let user = require_user(self.backend.as_ref())?;

        if let Err(e) = self
            .backend
            .delete(tables::ANNOTATIONS, &Query::new().eq("videoId", id))
            .await
        {
            tracing::warn!(video_id = id, error = %e, "Failed to delete video annotations");
        }

        self.backend
            .delete(
                tables::VIDEOS,
                &Query::new().eq("id", id).eq("ownerId", &user.id),
            )
            .await?;

        match object_path_from_public_url(url, &self.bucket) {
            Some(path) => {
                if let Err(e) = self.backend.remove_objects(&self.bucket, &[path]).await {
                    tracing::warn!(video_id = id, error = %e, "Failed to remove video file");
                }
            }
            None => tracing::debug!(video_id = id, url, "No storage path in video URL"),
        }

        tracing::info!(video_id = id, "Video deleted");
        Ok(())
    }

    // ---- private helpers ----

    async fn annotation_count(&self, video_id: &str) -> DataResult<u64> {
        if !ids::is_valid_uuid(video_id) {
            return Ok(0);
        }
        self.backend
            .count(tables::ANNOTATIONS, &Query::new().eq("videoId", video_id))
            .await
    }
}

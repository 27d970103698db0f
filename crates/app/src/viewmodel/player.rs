//! Player screen: one video, its annotations, sharing and comments.
//!
//! Playback itself is external. The screen reports positions and frame
//! rates in, and gets seek targets back.

use std::collections::HashSet;
use std::sync::Arc;

use perspecto_core::error::CoreError;
use perspecto_core::ids::new_record_id;
use perspecto_core::media::{self, PlaybackPosition};
use perspecto_core::optimistic::remove_tentatively;
use perspecto_core::severity::Severity;
use perspecto_core::text::is_blank;
use perspecto_db::models::{Annotation, NewAnnotation, Video};
use perspecto_db::repositories::{AnnotationRepo, VideoRepo};
use perspecto_db::{DataError, DataResult};
use tokio::sync::watch;

use super::{error_message, InFlight};
use crate::view_state::cards::{settle, CardListState};

/// Header shown until (or unless) the video's title is known.
pub const DEFAULT_PLAYER_TITLE: &str = "Video Player";

/// Base of the public share link for a video.
pub const SHARE_BASE_URL: &str = "https://perspecto.ai";

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub video_id: String,
    /// Annotation to highlight once the list arrives.
    pub focus_annotation_id: Option<String>,
    pub video: Option<Video>,
    pub title: String,
    pub annotations: Vec<Annotation>,
    pub cards: CardListState,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// State holder for the player screen.
#[derive(Clone)]
pub struct VideoPlayerViewModel {
    videos: VideoRepo,
    annotations: AnnotationRepo,
    state: Arc<watch::Sender<PlayerState>>,
}

impl VideoPlayerViewModel {
    pub fn new(
        video_id: &str,
        focus_annotation_id: Option<&str>,
        videos: VideoRepo,
        annotations: AnnotationRepo,
    ) -> Self {
        let (state, _) = watch::channel(PlayerState {
            video_id: video_id.to_string(),
            focus_annotation_id: focus_annotation_id.map(str::to_string),
            video: None,
            title: DEFAULT_PLAYER_TITLE.to_string(),
            annotations: Vec::new(),
            cards: CardListState::new(),
            is_loading: true,
            error: None,
        });
        Self {
            videos,
            annotations,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PlayerState {
        self.state.borrow().clone()
    }

    fn video_id(&self) -> String {
        self.state.borrow().video_id.clone()
    }

    // ---- loading ----

    /// Load the video and its annotations together.
    ///
    /// A video the user does not own leaves [`PlayerState::video`] empty and
    /// the header at [`DEFAULT_PLAYER_TITLE`]; its annotations still load.
    pub async fn load(&self) {
        let video_id = self.video_id();
        self.update(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let in_flight = InFlight::new(&self.state, |s: &mut PlayerState| s.is_loading = false);
        let (video, annotations) = tokio::join!(
            self.videos.find_for_current_user(&video_id),
            self.annotations.list_for_video(&video_id),
        );
        in_flight.finish();

        self.update(|s| {
            match video {
                Ok(video) => {
                    s.title = title_for(&video);
                    s.video = Some(video);
                }
                Err(DataError::Core(CoreError::NotFound { .. })) => {
                    tracing::debug!(video_id = %video_id, "Video not owned by current user");
                }
                Err(e) => {
                    tracing::warn!(video_id = %video_id, error = %e, "Video fetch failed");
                    s.error = Some(error_message(&e, "Failed to load video"));
                }
            }
            match annotations {
                Ok(list) => {
                    s.annotations = list;
                    if let Some(focus) = s.focus_annotation_id.take() {
                        if s.annotations.iter().any(|a| a.id == focus) {
                            s.cards.set_active(Some(&focus));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(video_id = %video_id, error = %e, "Annotation fetch failed");
                    s.error = Some(error_message(&e, "Failed to load annotations"));
                }
            }
            s.is_loading = false;
        });
    }

    /// Re-fetch only the annotation list.
    pub async fn refresh_annotations(&self) -> DataResult<()> {
        let list = self.annotations.list_for_video(&self.video_id()).await?;
        self.update(|s| s.annotations = list);
        Ok(())
    }

    // ---- playback ----

    /// Mark `annotation_id` active and return where the player should seek.
    ///
    /// `None` when the annotation is not loaded.
    pub fn select_annotation(&self, annotation_id: &str, fps: f32) -> Option<i64> {
        let mut target = None;
        self.update(|s| {
            if let Some(a) = s.annotations.iter().find(|a| a.id == annotation_id) {
                target = Some(media::seek_target_ms(a.start_frame, a.timestamp, fps));
                s.cards.set_active(Some(annotation_id));
            }
        });
        target
    }

    /// Position to stamp on a new annotation.
    pub fn capture_position(position_ms: u64, fps: f32) -> PlaybackPosition {
        PlaybackPosition::capture(position_ms, fps)
    }

    // ---- cards ----

    pub fn on_card_released(&self, id: &str, offset: f32, velocity: f32) {
        self.update(|s| s.cards.on_settled(id, settle(offset, velocity)));
    }

    pub fn on_card_click(&self, id: &str) {
        self.update(|s| s.cards.on_click(id));
    }

    // ---- writes ----

    /// Create an annotation at `position`, then reload the list.
    pub async fn add_annotation(
        &self,
        content: &str,
        severity: Severity,
        position: PlaybackPosition,
    ) -> DataResult<()> {
        if is_blank(content) {
            return Err(CoreError::Validation("Annotation text must not be empty".into()).into());
        }
        let draft = NewAnnotation::point(
            new_record_id(),
            &self.video_id(),
            content.trim().to_string(),
            severity,
            position.timestamp_secs,
            position.frame,
        );
        if let Err(e) = self.annotations.create(&draft).await {
            self.update(|s| s.error = Some(format!("Failed to add annotation: {e}")));
            return Err(e);
        }
        self.refresh_annotations().await
    }

    /// Delete an annotation; the card disappears before the remote call.
    pub async fn delete_annotation(&self, id: &str) {
        let mut edit = None;
        self.update(|s| {
            edit = Some(remove_tentatively(&mut s.annotations, |a| a.id == id));
            s.cards.on_deleted(id);
        });
        let Some(edit) = edit else {
            return;
        };

        match self.annotations.delete(id).await {
            Ok(()) => {
                let _ = edit.confirm();
            }
            Err(e) => {
                let message = format!("Failed to delete: {e}");
                match self.annotations.list_for_video(&self.video_id()).await {
                    Ok(fresh) => self.update(|s| {
                        edit.reconcile(&mut s.annotations, fresh);
                        s.error = Some(message);
                    }),
                    Err(fetch_err) => {
                        tracing::warn!(error = %fetch_err, "Re-fetch after failed delete failed");
                        self.update(|s| {
                            edit.restore(&mut s.annotations);
                            s.error = Some(message);
                        });
                    }
                }
            }
        }
    }

    /// Set the sharing flags. The switches move at once and snap back if
    /// the backend refuses.
    pub async fn update_sharing(&self, is_public: bool, allow_annotations: bool) {
        let mut previous = None;
        self.update(|s| {
            if let Some(video) = s.video.as_mut() {
                previous = Some((video.is_public, video.allow_annotations));
                video.is_public = is_public;
                video.allow_annotations = allow_annotations;
            }
        });

        if let Err(e) = self
            .videos
            .update_sharing(&self.video_id(), is_public, allow_annotations)
            .await
        {
            tracing::warn!(error = %e, "Sharing update failed");
            self.update(|s| {
                if let (Some(video), Some((was_public, was_allowing))) = (s.video.as_mut(), previous) {
                    video.is_public = was_public;
                    video.allow_annotations = was_allowing;
                }
                s.error = Some(format!("Failed to update sharing: {e}"));
            });
        }
    }

    /// Share link, present only while the video is public.
    pub fn share_link(&self) -> Option<String> {
        let state = self.state.borrow();
        state
            .video
            .as_ref()
            .filter(|v| v.is_public)
            .map(|_| format!("{SHARE_BASE_URL}?share={}", state.video_id))
    }

    /// Append a comment to an annotation's thread.
    pub async fn add_comment(&self, annotation_id: &str, content: &str) -> DataResult<()> {
        if is_blank(content) {
            return Err(CoreError::Validation("Comment must not be empty".into()).into());
        }
        let comment = self
            .annotations
            .add_comment(annotation_id, content.trim())
            .await?;
        self.update(|s| {
            if let Some(a) = s.annotations.iter_mut().find(|a| a.id == annotation_id) {
                a.comments.push(comment);
            }
        });
        Ok(())
    }

    // ---- private helpers ----

    fn update(&self, f: impl FnOnce(&mut PlayerState)) {
        self.state.send_modify(|s| {
            f(s);
            let ids: HashSet<&str> = s.annotations.iter().map(|a| a.id.as_str()).collect();
            s.cards.retain(&ids);
        });
    }
}

fn title_for(video: &Video) -> String {
    match video.display_title() {
        "" => DEFAULT_PLAYER_TITLE.to_string(),
        title => title.to_string(),
    }
}

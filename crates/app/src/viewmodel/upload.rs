//! Upload screen: pick a file, give it a title, send it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use perspecto_core::media::MediaInfo;
use perspecto_core::text::is_blank;
use perspecto_db::models::NewVideo;
use perspecto_db::repositories::VideoRepo;
use tokio::sync::watch;

#[derive(Debug, Clone, Default)]
pub struct UploadState {
    pub title: String,
    pub selected_file: Option<PathBuf>,
    /// What the platform media probe reported for the selected file.
    pub media: MediaInfo,
    pub is_uploading: bool,
    pub error: Option<String>,
    /// Row written by the last successful upload.
    pub uploaded: Option<NewVideo>,
}

/// State holder for the upload screen.
#[derive(Clone)]
pub struct UploadViewModel {
    videos: VideoRepo,
    state: Arc<watch::Sender<UploadState>>,
}

impl UploadViewModel {
    pub fn new(videos: VideoRepo) -> Self {
        let (state, _) = watch::channel(UploadState::default());
        Self {
            videos,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UploadState {
        self.state.borrow().clone()
    }

    pub fn set_title(&self, title: &str) {
        self.state.send_modify(|s| s.title = title.to_string());
    }

    pub fn select_file(&self, path: &Path, media: MediaInfo) {
        self.state.send_modify(|s| {
            s.selected_file = Some(path.to_path_buf());
            s.media = media;
        });
    }

    /// Read the selected file and upload it. The form is cleared on success.
    pub async fn upload(&self) {
        let (title, file, media) = {
            let s = self.state.borrow();
            (s.title.clone(), s.selected_file.clone(), s.media)
        };
        let Some(file) = file.filter(|_| !is_blank(&title)) else {
            self.state.send_modify(|s| {
                s.error = Some("Please enter title and select video".to_string());
            });
            return;
        };

        self.state.send_modify(|s| {
            s.is_uploading = true;
            s.error = None;
            s.uploaded = None;
        });

        let result = match tokio::fs::read(&file).await {
            Ok(bytes) => self
                .videos
                .upload(title.trim(), bytes, media)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("Failed to read {}: {e}", file.display())),
        };

        self.state.send_modify(|s| {
            match result {
                Ok(row) => {
                    s.title.clear();
                    s.selected_file = None;
                    s.media = MediaInfo::default();
                    s.uploaded = Some(row);
                }
                Err(message) => {
                    tracing::warn!(file = %file.display(), error = %message, "Upload failed");
                    s.error = Some(format!("Upload Failed: {message}"));
                }
            }
            s.is_uploading = false;
        });
    }
}

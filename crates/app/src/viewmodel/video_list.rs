//! Library screen: folders and videos of the signed-in user.

use std::sync::Arc;

use perspecto_core::optimistic::remove_tentatively;
use perspecto_db::models::Folder;
use perspecto_db::repositories::{FolderRepo, VideoRepo};
use perspecto_db::DataResult;
use tokio::sync::watch;

use super::{error_message, InFlight};
use crate::view_state::library::{
    folder_path, parent_folder_id, reduce_library, LibraryFilters, LibrarySources, LibraryView,
    VideoSort,
};

const FETCH_FALLBACK: &str = "Failed to fetch data";

/// Everything the library screen renders.
#[derive(Debug, Clone, Default)]
pub struct VideoListState {
    pub sources: LibrarySources,
    pub filters: LibraryFilters,
    /// Derived from `sources` and `filters`.
    pub view: LibraryView,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
}

/// State holder for the library screen.
#[derive(Clone)]
pub struct VideoListViewModel {
    videos: VideoRepo,
    folders: FolderRepo,
    state: Arc<watch::Sender<VideoListState>>,
}

impl VideoListViewModel {
    pub fn new(videos: VideoRepo, folders: FolderRepo) -> Self {
        let (state, _) = watch::channel(VideoListState::default());
        Self {
            videos,
            folders,
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<VideoListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> VideoListState {
        self.state.borrow().clone()
    }

    pub fn view(&self) -> LibraryView {
        self.state.borrow().view.clone()
    }

    // ---- filters and navigation ----

    pub fn set_query(&self, query: &str) {
        self.update(|s| s.filters.query = query.to_string());
    }

    pub fn set_sort(&self, sort: VideoSort) {
        self.update(|s| s.filters.sort = sort);
    }

    pub fn open_folder(&self, folder_id: &str) {
        self.update(|s| s.filters.current_folder_id = Some(folder_id.to_string()));
    }

    /// Go up one level. Returns `false` when already at the root, so the
    /// caller can leave the screen instead.
    pub fn go_back(&self) -> bool {
        let mut moved = false;
        self.update(|s| {
            if s.filters.current_folder_id.is_some() {
                s.filters.current_folder_id = parent_folder_id(
                    &s.sources.folders,
                    s.filters.current_folder_id.as_deref(),
                );
                moved = true;
            }
        });
        moved
    }

    /// Folders from the root down to the current one.
    pub fn breadcrumbs(&self) -> Vec<Folder> {
        let state = self.state.borrow();
        folder_path(
            &state.sources.folders,
            state.filters.current_folder_id.as_deref(),
        )
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }

    // ---- remote operations ----

    /// Fetch videos, folders and memberships together.
    ///
    /// `refresh` raises the pull-to-refresh flag instead of the loading one.
    pub async fn fetch(&self, refresh: bool) {
        self.update(|s| {
            if refresh {
                s.is_refreshing = true;
            } else {
                s.is_loading = true;
            }
            s.error = None;
        });

        let in_flight = InFlight::new(&self.state, |s: &mut VideoListState| {
            s.is_loading = false;
            s.is_refreshing = false;
        });
        let result = self.load_sources().await;
        in_flight.finish();

        self.update(|s| {
            match result {
                Ok(sources) => s.sources = sources,
                Err(e) => {
                    tracing::warn!(error = %e, "Library fetch failed");
                    s.error = Some(error_message(&e, FETCH_FALLBACK));
                }
            }
            s.is_loading = false;
            s.is_refreshing = false;
        });
    }

    /// Delete a video.
    ///
    /// The row leaves the visible list immediately; once the remote call
    /// returns, the library is re-fetched so the list reflects the backend
    /// either way. A failure message survives the re-fetch.
    pub async fn delete_video(&self, id: &str, url: &str) {
        let mut edit = None;
        self.update(|s| edit = Some(remove_tentatively(&mut s.sources.videos, |v| v.id == id)));

        let deleted = match self.videos.delete(id, url).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(video_id = id, error = %e, "Video delete failed");
                self.update(|s| s.error = Some(format!("Failed to delete video: {e}")));
                false
            }
        };

        match (self.load_sources().await, edit) {
            (Ok(fresh), edit) => self.update(|s| {
                match edit {
                    Some(edit) => edit.reconcile(&mut s.sources.videos, fresh.videos),
                    None => s.sources.videos = fresh.videos,
                }
                s.sources.folders = fresh.folders;
                s.sources.memberships = fresh.memberships;
            }),
            (Err(e), Some(edit)) => {
                tracing::warn!(error = %e, "Re-fetch after delete failed");
                if deleted {
                    let _ = edit.confirm();
                } else {
                    self.update(|s| edit.restore(&mut s.sources.videos));
                }
            }
            (Err(e), None) => tracing::warn!(error = %e, "Re-fetch after delete failed"),
        }
    }

    // ---- private helpers ----

    async fn load_sources(&self) -> DataResult<LibrarySources> {
        let (videos, folders, memberships) = tokio::try_join!(
            self.videos.list_for_current_user(),
            self.folders.list_for_current_user(),
            self.folders.list_memberships(),
        )?;
        Ok(LibrarySources {
            videos,
            folders,
            memberships,
        })
    }

    /// Mutate raw state, then recompute the derived view and publish.
    fn update(&self, f: impl FnOnce(&mut VideoListState)) {
        self.state.send_modify(|s| {
            f(s);
            s.view = reduce_library(&s.sources, &s.filters);
        });
    }
}

//! Library screen flows against the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use perspecto_app::scope::ScreenScope;
use perspecto_app::view_state::VideoSort;
use perspecto_app::viewmodel::VideoListViewModel;
use perspecto_db::backend::tables;
use perspecto_db::memory::STORAGE;
use perspecto_db::repositories::{FolderRepo, VideoRepo};
use perspecto_db::{Backend, MemoryBackend};
use serde_json::json;

const V1: &str = "11111111-1111-4111-8111-111111111111";
const V2: &str = "22222222-2222-4222-8222-222222222222";
const V3: &str = "33333333-3333-4333-8333-333333333333";

fn seeded() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::with_user("u1"));
    backend.seed(
        tables::VIDEOS,
        [
            json!({"id": V1, "videoId": "vid1", "title": "Kickstart demo", "url": "memory://storage/v1/object/public/videos/u1/vid1.mp4", "ownerId": "u1", "fileSize": 300}),
            json!({"id": V2, "videoId": "vid2", "title": "Review", "url": "memory://storage/v1/object/public/videos/u1/vid2.mp4", "ownerId": "u1", "fileSize": 100}),
            json!({"id": V3, "videoId": "vid3", "title": "Retro", "url": "memory://storage/v1/object/public/videos/u1/vid3.mp4", "ownerId": "u1", "fileSize": 200}),
        ],
    );
    backend.seed(
        tables::FOLDERS,
        [
            json!({"id": "f1", "name": "Sprint", "owner_id": "u1"}),
            json!({"id": "f2", "name": "Archive", "owner_id": "u1", "parent_id": "f1"}),
        ],
    );
    backend.seed(
        tables::PROJECT_FOLDERS,
        [
            json!({"project_id": V2, "folder_id": "f1"}),
            json!({"project_id": V3, "folder_id": "f2"}),
        ],
    );
    backend.seed(
        tables::ANNOTATIONS,
        [json!({"id": "a1", "videoId": V1, "userId": "u1", "content": "", "title": "", "severity": "low", "timestamp": 1.0})],
    );
    backend
}

fn view_model(backend: &Arc<MemoryBackend>) -> VideoListViewModel {
    let backend = backend.clone() as Arc<dyn Backend>;
    VideoListViewModel::new(VideoRepo::new(backend.clone()), FolderRepo::new(backend))
}

fn titles(vm: &VideoListViewModel) -> Vec<String> {
    vm.view().videos.into_iter().map(|v| v.title).collect()
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// The root shows top-level folders and unfiled videos only.
#[tokio::test]
async fn fetch_populates_root_level() {
    let backend = seeded();
    let vm = view_model(&backend);
    vm.fetch(false).await;

    let state = vm.snapshot();
    assert!(!state.is_loading);
    assert!(!state.is_refreshing);
    assert_eq!(state.error, None);

    let folders: Vec<(String, usize)> = state
        .view
        .folders
        .iter()
        .map(|f| (f.folder.name.clone(), f.video_count))
        .collect();
    assert_eq!(folders, vec![("Sprint".to_string(), 1)]);
    assert_eq!(titles(&vm), vec!["Kickstart demo"]);
    assert_eq!(state.view.videos[0].annotation_count, 1);
}

/// A failed fetch stores the backend message and clears both flags.
#[tokio::test]
async fn fetch_failure_sets_error() {
    let backend = seeded();
    backend.fail(tables::FOLDERS);
    let vm = view_model(&backend);
    vm.fetch(true).await;

    let state = vm.snapshot();
    assert_eq!(state.error.as_deref(), Some("Simulated failure on folders"));
    assert!(!state.is_loading);
    assert!(!state.is_refreshing);
}

/// Subscribers see the refreshing flag while the fetch is in flight.
#[tokio::test]
async fn refresh_flag_visible_during_fetch() {
    let backend = seeded();
    backend.set_latency(Duration::from_millis(50));
    let vm = view_model(&backend);

    let task = tokio::spawn({
        let vm = vm.clone();
        async move { vm.fetch(true).await }
    });
    tokio::task::yield_now().await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(vm.snapshot().is_refreshing);
    assert!(!vm.snapshot().is_loading);

    task.await.unwrap();
    assert!(!vm.snapshot().is_refreshing);
}

// ---------------------------------------------------------------------------
// Navigation and filters
// ---------------------------------------------------------------------------

/// Opening folders walks down the tree; going back walks up to the root.
#[tokio::test]
async fn folder_navigation_round_trip() {
    let backend = seeded();
    let vm = view_model(&backend);
    vm.fetch(false).await;

    vm.open_folder("f1");
    assert_eq!(titles(&vm), vec!["Review"]);
    assert_eq!(vm.view().current_folder_name.as_deref(), Some("Sprint"));

    vm.open_folder("f2");
    assert_eq!(titles(&vm), vec!["Retro"]);
    let crumbs: Vec<String> = vm.breadcrumbs().into_iter().map(|f| f.name).collect();
    assert_eq!(crumbs, vec!["Sprint", "Archive"]);

    assert!(vm.go_back());
    assert_eq!(vm.snapshot().filters.current_folder_id.as_deref(), Some("f1"));
    assert!(vm.go_back());
    assert_eq!(vm.snapshot().filters.current_folder_id, None);
    assert!(!vm.go_back());
}

/// A search query spans the whole tree and ignores the current folder.
#[tokio::test]
async fn search_ignores_current_folder() {
    let backend = seeded();
    let vm = view_model(&backend);
    vm.fetch(false).await;

    vm.open_folder("f2");
    vm.set_query("re");
    assert_eq!(titles(&vm), vec!["Review", "Retro"]);
    assert!(vm.view().folders.is_empty());
}

/// Sorting by size puts the largest file first.
#[tokio::test]
async fn sort_by_file_size() {
    let backend = seeded();
    let vm = view_model(&backend);
    vm.fetch(false).await;

    vm.set_query("e");
    vm.set_sort(VideoSort::FileSize);
    assert_eq!(titles(&vm), vec!["Kickstart demo", "Retro", "Review"]);
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

/// The row disappears before the backend answers, and stays gone after.
#[tokio::test]
async fn delete_removes_row_immediately() {
    let backend = seeded();
    let vm = view_model(&backend);
    vm.fetch(false).await;
    backend.set_latency(Duration::from_millis(50));

    let url = vm.view().videos[0].url.clone();
    let task = tokio::spawn({
        let vm = vm.clone();
        async move { vm.delete_video(V1, &url).await }
    });
    tokio::task::yield_now().await;
    assert!(titles(&vm).is_empty());

    task.await.unwrap();
    assert!(titles(&vm).is_empty());
    assert!(backend.rows(tables::VIDEOS).iter().all(|r| r["id"] != V1));
    assert!(backend.calls().contains(&format!("remove {STORAGE}")));
    assert_eq!(vm.snapshot().error, None);
}

/// A refused delete brings the row back and keeps the message.
#[tokio::test]
async fn failed_delete_reconciles_and_keeps_error() {
    let backend = seeded();
    let vm = view_model(&backend);
    vm.fetch(false).await;
    backend.fail("delete videos");

    let url = vm.view().videos[0].url.clone();
    vm.delete_video(V1, &url).await;

    assert_eq!(titles(&vm), vec!["Kickstart demo"]);
    assert_eq!(
        vm.snapshot().error.as_deref(),
        Some("Failed to delete video: Simulated failure on videos")
    );

    vm.clear_error();
    assert_eq!(vm.snapshot().error, None);
}

// ---------------------------------------------------------------------------
// Screen scope
// ---------------------------------------------------------------------------

/// A refresh cancelled with its screen leaves no spinner behind.
#[tokio::test]
async fn closed_scope_clears_refresh_flag() {
    let backend = seeded();
    backend.set_latency(Duration::from_millis(50));
    let vm = view_model(&backend);
    let scope = ScreenScope::new();

    let handle = scope.launch({
        let vm = vm.clone();
        async move { vm.fetch(true).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(vm.snapshot().is_refreshing);
    scope.close();

    assert_eq!(handle.await.unwrap(), None);
    let state = vm.snapshot();
    assert!(!state.is_refreshing);
    assert!(!state.is_loading);
    assert!(titles(&vm).is_empty());
}

//! Pure view-state reducers.
//!
//! Nothing here performs I/O; the view models call these on every input
//! change and publish the result.

pub mod annotations;
pub mod cards;
pub mod library;

pub use annotations::{filter_and_sort, AnnotationSort};
pub use cards::{settle, CardListState, SwipeAnchor};
pub use library::{
    folder_path, parent_folder_id, reduce_library, FolderWithCount, LibraryFilters,
    LibrarySources, LibraryView, VideoSort,
};

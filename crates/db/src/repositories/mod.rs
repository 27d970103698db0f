//! Repository layer.
//!
//! Each repository wraps the injected [`Backend`](crate::backend::Backend)
//! and performs one or two remote calls per operation, reshaping the
//! result where needed (counts, comment threads). They hold no state of
//! their own beyond the backend handle.

pub mod account_repo;
pub mod annotation_repo;
pub mod folder_repo;
pub mod video_repo;

pub use account_repo::AccountRepo;
pub use annotation_repo::{merge_comments, AnnotationRepo};
pub use folder_repo::FolderRepo;
pub use video_repo::{VideoRepo, UPLOAD_VIDEO_TYPE};

//! Video library view-state: the folder tree, search, and video sorting.
//!
//! [`reduce_library`] is a pure function of the fetched rows and the
//! current filters. Without a search query the library is browsed one
//! folder level at a time; with one, folders and videos are matched by name
//! across the whole tree.

use std::collections::{HashMap, HashSet};

use perspecto_core::text::{contains_ignore_case, is_blank};
use perspecto_db::models::{Folder, FolderMembership, Video};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Video ordering offered by the library screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSort {
    /// Largest first; videos without a size count as 0 bytes.
    FileSize,
    /// Most recently updated first; videos without a date go last.
    #[default]
    UpdateDate,
    /// Title, ascending.
    FileName,
}

/// Raw rows as fetched.
#[derive(Debug, Clone, Default)]
pub struct LibrarySources {
    pub videos: Vec<Video>,
    pub folders: Vec<Folder>,
    pub memberships: Vec<FolderMembership>,
}

/// User-controlled browsing state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryFilters {
    /// `None` is the root level.
    pub current_folder_id: Option<String>,
    pub query: String,
    pub sort: VideoSort,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A folder plus the number of videos filed directly under it.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderWithCount {
    pub folder: Folder,
    pub video_count: usize,
}

/// What the library screen shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryView {
    pub folders: Vec<FolderWithCount>,
    pub videos: Vec<Video>,
    pub current_folder_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Derive the visible library from raw rows and filters.
pub fn reduce_library(sources: &LibrarySources, filters: &LibraryFilters) -> LibraryView {
    let current = filters.current_folder_id.as_deref();

    let (mut folders, mut videos): (Vec<&Folder>, Vec<&Video>) = if is_blank(&filters.query) {
        let folders: Vec<&Folder> = sources
            .folders
            .iter()
            .filter(|f| f.parent_id.as_deref() == current)
            .collect();
        let videos: Vec<&Video> = match current {
            None => {
                let filed: HashSet<&str> = sources
                    .memberships
                    .iter()
                    .map(|m| m.project_id.as_str())
                    .collect();
                sources
                    .videos
                    .iter()
                    .filter(|v| !filed.contains(v.id.as_str()))
                    .collect()
            }
            Some(folder_id) => {
                let inside: HashSet<&str> = sources
                    .memberships
                    .iter()
                    .filter(|m| m.folder_id == folder_id)
                    .map(|m| m.project_id.as_str())
                    .collect();
                sources
                    .videos
                    .iter()
                    .filter(|v| inside.contains(v.id.as_str()))
                    .collect()
            }
        };
        (folders, videos)
    } else {
        let query = filters.query.as_str();
        let folders: Vec<&Folder> = sources
            .folders
            .iter()
            .filter(|f| contains_ignore_case(&f.name, query))
            .collect();
        let videos: Vec<&Video> = sources
            .videos
            .iter()
            .filter(|v| contains_ignore_case(&v.title, query))
            .collect();
        (folders, videos)
    };

    sort_videos(&mut videos, filters.sort);
    folders.sort_by(|a, b| a.name.cmp(&b.name));

    let counts = membership_counts(&sources.memberships);
    let current_folder_name = current.and_then(|id| {
        sources
            .folders
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.name.clone())
    });

    LibraryView {
        folders: folders
            .into_iter()
            .map(|folder| FolderWithCount {
                video_count: counts.get(folder.id.as_str()).copied().unwrap_or(0),
                folder: folder.clone(),
            })
            .collect(),
        videos: videos.into_iter().cloned().collect(),
        current_folder_name,
    }
}

/// Stable in-place sort of videos.
pub fn sort_videos(videos: &mut [&Video], sort: VideoSort) {
    match sort {
        VideoSort::FileSize => {
            videos.sort_by(|a, b| b.file_size.unwrap_or(0).cmp(&a.file_size.unwrap_or(0)))
        }
        // `None` orders before `Some`, so reversing puts undated videos last.
        VideoSort::UpdateDate => videos.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        VideoSort::FileName => videos.sort_by(|a, b| a.title.cmp(&b.title)),
    }
}

fn membership_counts(memberships: &[FolderMembership]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for m in memberships {
        *counts.entry(m.folder_id.as_str()).or_insert(0) += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Folder to show after "back" from `current`.
///
/// Returns the parent, or `None` (root) when the folder has no parent, is
/// unknown, or its parent chain loops back on itself.
pub fn parent_folder_id(folders: &[Folder], current: Option<&str>) -> Option<String> {
    let current = current?;
    let by_id: HashMap<&str, &Folder> = folders.iter().map(|f| (f.id.as_str(), f)).collect();
    let parent = by_id.get(current)?.parent_id.as_deref()?;
    if chain_reaches(&by_id, parent, current) {
        tracing::warn!(folder_id = current, "Folder cycle detected, returning to root");
        return None;
    }
    Some(parent.to_string())
}

/// Breadcrumbs from the root down to `current`, inclusive.
///
/// The walk stops at the first folder seen twice, so a cyclic chain yields
/// a finite path.
pub fn folder_path(folders: &[Folder], current: Option<&str>) -> Vec<Folder> {
    let by_id: HashMap<&str, &Folder> = folders.iter().map(|f| (f.id.as_str(), f)).collect();
    let mut path = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = current;
    while let Some(id) = cursor {
        if !seen.insert(id) {
            break;
        }
        let Some(folder) = by_id.get(id) else {
            break;
        };
        path.push((*folder).clone());
        cursor = folder.parent_id.as_deref();
    }
    path.reverse();
    path
}

/// Whether walking parents from `start` ever reaches `target`.
fn chain_reaches(by_id: &HashMap<&str, &Folder>, start: &str, target: &str) -> bool {
    let mut seen = HashSet::new();
    let mut cursor = Some(start);
    while let Some(id) = cursor {
        if id == target {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        cursor = by_id.get(id).and_then(|f| f.parent_id.as_deref());
    }
    false
}

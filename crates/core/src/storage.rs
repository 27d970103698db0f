//! Object-storage naming rules for uploaded videos.
//!
//! Uploads land at `<owner id>/<video id>.mp4` inside the video bucket. The
//! public URL handed back by the backend embeds that path after
//! `/<bucket>/`, which is how deletion recovers it later.

/// Default bucket holding uploaded video files.
pub const DEFAULT_VIDEO_BUCKET: &str = "videos";

/// Extension given to every uploaded video object.
pub const VIDEO_EXTENSION: &str = "mp4";

/// MIME type sent with video uploads.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Object path for a new upload: `<owner_id>/<video_id>.mp4`.
pub fn video_object_path(owner_id: &str, video_id: &str) -> String {
    format!("{owner_id}/{video_id}.{VIDEO_EXTENSION}")
}

/// Recover the object path from a public URL.
///
/// Returns everything after the first `/<bucket>/` segment, or `None` when
/// the URL does not reference the bucket (or nothing follows it).
pub fn object_path_from_public_url(url: &str, bucket: &str) -> Option<String> {
    let marker = format!("/{bucket}/");
    let start = url.find(&marker)? + marker.len();
    let path = &url[start..];
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

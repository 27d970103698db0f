//! Playback position and media metadata helpers.
//!
//! Metadata extraction and decoding happen outside this crate; callers hand
//! in whatever the platform's media probe reported. The `videos` table has
//! check constraints requiring a positive duration and frame count, so
//! missing values fall back to the smallest accepted ones.

/// Duration written when the probe reported none (seconds).
pub const FALLBACK_DURATION_SECS: f64 = 1.0;

/// Frame count written when the probe reported none.
pub const FALLBACK_TOTAL_FRAMES: i64 = 1;

/// Metadata reported by the platform media probe for an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediaInfo {
    pub duration_ms: Option<u64>,
    pub total_frames: Option<i64>,
}

impl MediaInfo {
    /// Duration in seconds, never below the accepted minimum.
    pub fn duration_secs(&self) -> f64 {
        let secs = self.duration_ms.unwrap_or(0) as f64 / 1000.0;
        if secs > 0.0 {
            secs
        } else {
            FALLBACK_DURATION_SECS
        }
    }

    /// Frame count, never below the accepted minimum.
    pub fn total_frames(&self) -> i64 {
        match self.total_frames {
            Some(n) if n > 0 => n,
            _ => FALLBACK_TOTAL_FRAMES,
        }
    }
}

/// Playback position captured when the user starts a new annotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackPosition {
    pub timestamp_secs: f64,
    /// Only known when the stream reports a frame rate.
    pub frame: Option<i32>,
}

impl PlaybackPosition {
    pub fn capture(position_ms: u64, fps: f32) -> Self {
        let timestamp_secs = position_ms as f64 / 1000.0;
        let frame = if fps > 0.0 {
            Some((timestamp_secs * f64::from(fps)) as i32)
        } else {
            None
        };
        Self {
            timestamp_secs,
            frame,
        }
    }
}

/// Player position (milliseconds) to seek to for an annotation.
///
/// Frame-accurate when the annotation has a start frame and the frame rate
/// is known; otherwise the stored timestamp is used.
pub fn seek_target_ms(start_frame: Option<i32>, timestamp_secs: f64, fps: f32) -> i64 {
    match start_frame {
        Some(frame) if fps > 0.0 => (frame as f32 / fps * 1000.0) as i64,
        _ => (timestamp_secs * 1000.0) as i64,
    }
}

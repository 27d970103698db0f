//! Records mirroring remote table rows.
//!
//! Field names follow the remote schema exactly: the `videos`,
//! `annotations` and `annotation_comments` tables use camelCase columns,
//! `folders` and `project_folders` use snake_case.

pub mod annotation;
pub mod folder;
pub mod session;
pub mod video;

pub use annotation::{Annotation, Comment, NewAnnotation, NewComment};
pub use folder::{Folder, FolderMembership};
pub use session::{AuthUser, Session};
pub use video::{NewVideo, UpdateVideoSharing, Video};

/// Lenient timestamp decoding.
///
/// Columns typed `timestamptz` arrive as RFC 3339 strings, plain
/// `timestamp` columns arrive without an offset (taken as UTC). Anything
/// else decodes as `None` rather than failing the whole row.
pub(crate) mod lenient_timestamp {
    use chrono::{NaiveDateTime, TimeZone, Utc};
    use perspecto_core::types::Timestamp;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<Timestamp> {
        if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }

    pub fn serialize<S>(value: &Option<Timestamp>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::Datelike;

        #[test]
        fn rfc3339_with_offset() {
            let ts = parse("2024-05-01T12:00:00.123456+02:00").unwrap();
            assert_eq!(ts.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
        }

        #[test]
        fn naive_is_taken_as_utc() {
            let ts = parse("2024-05-01T12:00:00").unwrap();
            assert_eq!(ts.day(), 1);
            assert_eq!(ts.to_rfc3339(), "2024-05-01T12:00:00+00:00");
        }

        #[test]
        fn space_separated_is_accepted() {
            assert!(parse("2024-05-01 12:00:00.5").is_some());
        }

        #[test]
        fn garbage_is_none() {
            assert!(parse("yesterday").is_none());
        }
    }
}

/// Remote primary keys are UUID strings issued by the backend.
///
/// They are kept as strings because rows created by older clients may carry
/// non-UUID identifiers (see [`crate::ids::is_valid_uuid`]).
pub type RecordId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

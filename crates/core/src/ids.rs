//! Record identifier helpers.
//!
//! The hosted tables use `uuid` primary keys. Filtering a uuid column with a
//! non-conforming string makes the backend reject the whole query, so
//! callers check ids up front and treat a malformed id as "matches nothing".

use uuid::Uuid;

use crate::types::RecordId;

/// Whether `id` parses as a UUID (any version, hyphenated or simple form).
pub fn is_valid_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Generate a fresh random (v4) record id in hyphenated lowercase form.
pub fn new_record_id() -> RecordId {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyphenated_uuid_is_valid() {
        assert!(is_valid_uuid("6f1c2a0e-8d3b-4c71-9a55-0f3e2b7d9c11"));
    }

    #[test]
    fn uppercase_uuid_is_valid() {
        assert!(is_valid_uuid("6F1C2A0E-8D3B-4C71-9A55-0F3E2B7D9C11"));
    }

    #[test]
    fn short_ids_are_rejected() {
        assert!(!is_valid_uuid("v1"));
        assert!(!is_valid_uuid(""));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(!is_valid_uuid("not-a-uuid-at-all-really-no"));
    }

    #[test]
    fn generated_ids_are_valid_and_distinct() {
        let a = new_record_id();
        let b = new_record_id();
        assert!(is_valid_uuid(&a));
        assert_ne!(a, b);
    }
}

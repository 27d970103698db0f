//! Text matching used by the search boxes.

/// A query made only of whitespace counts as "no query".
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Case-insensitive substring test.
///
/// The needle is used as typed (not trimmed); an empty needle matches
/// everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

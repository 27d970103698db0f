//! Annotation list filtering and ordering.

use perspecto_core::severity;
use perspecto_core::text::{contains_ignore_case, is_blank};
use perspecto_db::models::Annotation;
use serde::Serialize;

/// Orderings offered by the annotation list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationSort {
    /// Latest playback position first.
    #[default]
    DateNewest,
    DateOldest,
    SeverityHighLow,
    SeverityLowHigh,
}

/// Annotations whose content or title contains `query`, in `sort` order.
///
/// A blank query keeps everything. Sorting is stable, so ties keep their
/// fetch order.
pub fn filter_and_sort(annotations: &[Annotation], query: &str, sort: AnnotationSort) -> Vec<Annotation> {
    let mut visible: Vec<Annotation> = if is_blank(query) {
        annotations.to_vec()
    } else {
        annotations
            .iter()
            .filter(|a| contains_ignore_case(&a.content, query) || contains_ignore_case(&a.title, query))
            .cloned()
            .collect()
    };

    match sort {
        AnnotationSort::DateNewest => visible.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp)),
        AnnotationSort::DateOldest => visible.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp)),
        AnnotationSort::SeverityHighLow => {
            visible.sort_by_key(|a| std::cmp::Reverse(severity::weight(&a.severity)))
        }
        AnnotationSort::SeverityLowHigh => visible.sort_by_key(|a| severity::weight(&a.severity)),
    }
    visible
}

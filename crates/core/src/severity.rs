//! Annotation severity labels, sort weights and badge tones.
//!
//! Severity is stored as free text on the annotation row. New annotations
//! are written with one of [`SELECTABLE_SEVERITIES`] (lowercased), but rows
//! written by other clients may hold anything, so every helper here is total.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Severities offered when creating an annotation, in menu order.
pub const SELECTABLE_SEVERITIES: &[Severity] = &[Severity::Low, Severity::Medium, Severity::High];

/// Severity preselected for a new annotation.
pub const DEFAULT_SEVERITY: Severity = Severity::Low;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Recognised severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Lowercase value stored in the `severity` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Capitalised label shown in menus.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Title written alongside a new annotation, e.g. `"High Priority"`.
    pub fn title(self) -> String {
        format!("{} Priority", self.label())
    }

    /// Case-insensitive exact parse. Unrecognised text yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Sort weight of this level.
    pub fn weight(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

/// Sort weight for a raw severity string: high=3, medium=2, low=1, else 0.
pub fn weight(severity: &str) -> u8 {
    Severity::parse(severity).map_or(0, Severity::weight)
}

// ---------------------------------------------------------------------------
// Badge tone
// ---------------------------------------------------------------------------

/// Colour family used for the severity badge.
///
/// Matching is by substring so labels like `"High Priority"` or
/// `"critical-high"` still get a tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Danger,
    Warning,
    Success,
    Improvement,
    Neutral,
}

impl BadgeTone {
    pub fn for_severity(severity: &str) -> Self {
        let lower = severity.to_lowercase();
        if lower.contains("high") || lower.contains("critical") {
            Self::Danger
        } else if lower.contains("medium") {
            Self::Warning
        } else if lower.contains("low") {
            Self::Success
        } else if lower.contains("improvement") {
            Self::Improvement
        } else {
            Self::Neutral
        }
    }
}

/// Badge text: the raw severity with its first character uppercased.
pub fn badge_text(severity: &str) -> String {
    let mut chars = severity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

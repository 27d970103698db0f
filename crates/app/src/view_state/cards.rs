//! Annotation card interaction state: swipe-to-reveal, text expansion and
//! the active (seeked-to) card.
//!
//! Offsets and velocities are in density-independent pixels; negative
//! values point left, towards the revealed actions.

use std::collections::HashSet;

/// Distance a revealed card is shifted left.
pub const REVEAL_OFFSET_DP: f32 = 100.0;

/// Fling speed above which the gesture direction alone picks the anchor.
pub const VELOCITY_THRESHOLD_DP: f32 = 100.0;

/// Fraction of the reveal distance past which a slow drag settles open.
pub const POSITIONAL_THRESHOLD: f32 = 0.5;

/// Resting positions of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAnchor {
    Closed,
    Revealed,
}

impl SwipeAnchor {
    /// Horizontal offset of the anchor.
    pub fn offset(self) -> f32 {
        match self {
            Self::Closed => 0.0,
            Self::Revealed => -REVEAL_OFFSET_DP,
        }
    }
}

/// Anchor a released drag settles on.
pub fn settle(offset: f32, velocity: f32) -> SwipeAnchor {
    if velocity.abs() > VELOCITY_THRESHOLD_DP {
        return if velocity < 0.0 {
            SwipeAnchor::Revealed
        } else {
            SwipeAnchor::Closed
        };
    }
    if offset <= -REVEAL_OFFSET_DP * POSITIONAL_THRESHOLD {
        SwipeAnchor::Revealed
    } else {
        SwipeAnchor::Closed
    }
}

/// Per-list card state.
///
/// At most one card is revealed at a time. Expansion is tracked per card
/// and survives reveal changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardListState {
    revealed: Option<String>,
    expanded: HashSet<String>,
    active: Option<String>,
}

impl CardListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revealed(&self) -> Option<&str> {
        self.revealed.as_deref()
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.as_deref() == Some(id)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Apply a settled swipe on `id`.
    pub fn on_settled(&mut self, id: &str, anchor: SwipeAnchor) {
        match anchor {
            SwipeAnchor::Revealed => self.revealed = Some(id.to_string()),
            SwipeAnchor::Closed => {
                if self.is_revealed(id) {
                    self.revealed = None;
                }
            }
        }
    }

    /// A tap on `id`: closes a revealed card, otherwise toggles expansion.
    ///
    /// Any tap closes whichever card was revealed.
    pub fn on_click(&mut self, id: &str) {
        let was_revealed = self.is_revealed(id);
        self.revealed = None;
        if was_revealed {
            return;
        }
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    /// Forget all state for a deleted card.
    pub fn on_deleted(&mut self, id: &str) {
        if self.is_revealed(id) {
            self.revealed = None;
        }
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        self.expanded.remove(id);
    }

    pub fn set_active(&mut self, id: Option<&str>) {
        self.active = id.map(str::to_string);
    }

    /// Drop state for cards that are no longer listed.
    pub fn retain(&mut self, ids: &HashSet<&str>) {
        if self.revealed.as_deref().is_some_and(|id| !ids.contains(id)) {
            self.revealed = None;
        }
        if self.active.as_deref().is_some_and(|id| !ids.contains(id)) {
            self.active = None;
        }
        self.expanded.retain(|id| ids.contains(id.as_str()));
    }
}

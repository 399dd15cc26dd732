#![forbid(unsafe_code)]

//! Display state of the manipulation controller.

use std::fmt;

/// What the user is doing, for UI feedback (cursor shape, status text).
///
/// Exactly one state is active at a time. Behavior never branches on it; it
/// is kept in step with the controller's internal trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering,
    Dragging,
    Selecting,
    Panning,
    Zooming,
}

impl InteractionState {
    /// Lowercase name, as used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Hovering => "hovering",
            Self::Dragging => "dragging",
            Self::Selecting => "selecting",
            Self::Panning => "panning",
            Self::Zooming => "zooming",
        }
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

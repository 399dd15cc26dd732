#![forbid(unsafe_code)]

//! Drag behavior configuration.

use web_time::Duration;

/// Largest smoothing factor accepted; `1.0` would freeze the node.
pub const MAX_SMOOTHING: f32 = 0.999;

/// Pin and smoothing policy for drags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragConfig {
    /// Pin the node at its current position when a drag starts (default: true).
    pub pin_on_drag: bool,
    /// Release the pin when the drag ends (default: true).
    pub unpin_on_release: bool,
    /// Delay before a released node is unpinned; zero unpins immediately
    /// (default: 2000ms).
    pub unpin_delay: Duration,
    /// Fraction of the remaining distance kept per update, in `[0, 1)`
    /// (default: 0.3). `0` follows the cursor exactly.
    pub smoothing: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            pin_on_drag: true,
            unpin_on_release: true,
            unpin_delay: Duration::from_millis(2000),
            smoothing: 0.3,
        }
    }
}

impl DragConfig {
    /// Human-readable problems with this configuration.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.smoothing.is_finite() && (0.0..1.0).contains(&self.smoothing)) {
            problems.push(format!(
                "drag.smoothing must be in [0, 1), got {}",
                self.smoothing
            ));
        }
        problems
    }

    /// Copy with `smoothing` clamped into `[0, MAX_SMOOTHING]`.
    ///
    /// A NaN smoothing falls back to the default.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.smoothing = if self.smoothing.is_nan() {
            Self::default().smoothing
        } else {
            self.smoothing.clamp(0.0, MAX_SMOOTHING)
        };
        self
    }

    /// Weight of the target in one smoothing step.
    #[inline]
    #[must_use]
    pub fn follow_factor(&self) -> f32 {
        1.0 - self.smoothing
    }
}

#![forbid(unsafe_code)]

//! Controller thresholds.

use web_time::Duration;

/// Thresholds and timing for the manipulation controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Euclidean distance in pixels a press must exceed to become a drag
    /// (default: 5.0).
    pub drag_threshold: f32,
    /// Minimum interval between hover lookups (default: 33ms).
    pub hover_throttle: Duration,
    /// World plane `z` the cursor is unprojected onto (default: 0.0).
    pub interaction_plane_z: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            hover_throttle: Duration::from_millis(33),
            interaction_plane_z: 0.0,
        }
    }
}

impl ControllerConfig {
    /// Human-readable problems with this configuration.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            problems.push(format!(
                "controller.drag_threshold must be a finite non-negative number, got {}",
                self.drag_threshold
            ));
        }
        if !self.interaction_plane_z.is_finite() {
            problems.push(format!(
                "controller.interaction_plane_z must be finite, got {}",
                self.interaction_plane_z
            ));
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.drag_threshold, 5.0);
        assert_eq!(config.hover_throttle, Duration::from_millis(33));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn rejects_negative_threshold() {
        let config = ControllerConfig {
            drag_threshold: -2.0,
            ..ControllerConfig::default()
        };
        assert_eq!(config.validate().len(), 1);
    }
}

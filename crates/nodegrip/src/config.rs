#![forbid(unsafe_code)]

//! Interaction configuration as data.
//!
//! Groups the tunables of the three components into one
//! [`InteractionConfig`] that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # nodegrip.toml
//! [controller]
//! drag_threshold = 8.0
//! hover_throttle_ms = 16
//!
//! [drag]
//! unpin_delay_ms = 0
//! smoothing = 0.5
//! ```
//!
//! ```rust,ignore
//! let config = InteractionConfig::from_toml_file("nodegrip.toml")?;
//! let config = InteractionConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the component's own default, so
//! `InteractionConfig::default()` behaves exactly like constructing each
//! component with `Default`. Missing sections and fields keep their defaults.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use nodegrip_drag::DragConfig;
use nodegrip_interact::ControllerConfig;
use nodegrip_pick::PickConfig;

// ---------------------------------------------------------------------------
// Top-level InteractionConfig
// ---------------------------------------------------------------------------

/// Tunables for the hit tester, controller and drag coordinator.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct InteractionConfig {
    /// Manipulation controller thresholds.
    pub controller: ControllerSection,
    /// Drag coordinator pin and smoothing policy.
    pub drag: DragSection,
    /// Hit tester fallback behavior.
    pub pick: PickSection,
}

impl InteractionConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of problems; empty means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.to_controller_config().validate();
        errors.extend(self.to_drag_config().validate());
        errors.extend(self.to_pick_config().validate());
        errors
    }

    /// `self` if valid, otherwise [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Convert to the controller's native config.
    #[must_use]
    pub fn to_controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            drag_threshold: self.controller.drag_threshold,
            hover_throttle: Duration::from_millis(self.controller.hover_throttle_ms),
            interaction_plane_z: self.controller.interaction_plane_z,
        }
    }

    /// Convert to the drag coordinator's native config.
    #[must_use]
    pub fn to_drag_config(&self) -> DragConfig {
        DragConfig {
            pin_on_drag: self.drag.pin_on_drag,
            unpin_on_release: self.drag.unpin_on_release,
            unpin_delay: Duration::from_millis(self.drag.unpin_delay_ms),
            smoothing: self.drag.smoothing,
        }
    }

    /// Convert to the hit tester's native config.
    #[must_use]
    pub fn to_pick_config(&self) -> PickConfig {
        PickConfig {
            fallback_to_nearest: self.pick.fallback_to_nearest,
            fallback_tolerance: self.pick.fallback_tolerance,
            fallback_plane_z: self.pick.fallback_plane_z,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Manipulation controller section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ControllerSection {
    /// Pixels a press must move (strictly more than) to become a drag.
    pub drag_threshold: f32,
    /// Minimum interval between hover lookups, in milliseconds.
    pub hover_throttle_ms: u64,
    /// World plane the cursor is unprojected onto.
    pub interaction_plane_z: f32,
}

impl Default for ControllerSection {
    fn default() -> Self {
        let c = ControllerConfig::default();
        Self {
            drag_threshold: c.drag_threshold,
            hover_throttle_ms: c.hover_throttle.as_millis() as u64,
            interaction_plane_z: c.interaction_plane_z,
        }
    }
}

/// Drag coordinator section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct DragSection {
    pub pin_on_drag: bool,
    pub unpin_on_release: bool,
    /// Delay before a released node is unpinned; 0 unpins immediately.
    pub unpin_delay_ms: u64,
    /// Fraction of remaining distance kept per update, in `[0, 1)`.
    pub smoothing: f32,
}

impl Default for DragSection {
    fn default() -> Self {
        let c = DragConfig::default();
        Self {
            pin_on_drag: c.pin_on_drag,
            unpin_on_release: c.unpin_on_release,
            unpin_delay_ms: c.unpin_delay.as_millis() as u64,
            smoothing: c.smoothing,
        }
    }
}

/// Hit tester section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PickSection {
    pub fallback_to_nearest: bool,
    pub fallback_tolerance: f32,
    pub fallback_plane_z: f32,
}

impl Default for PickSection {
    fn default() -> Self {
        let c = PickConfig::default();
        Self {
            fallback_to_nearest: c.fallback_to_nearest,
            fallback_tolerance: c.fallback_tolerance,
            fallback_plane_z: c.fallback_plane_z,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading or validating an [`InteractionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_components() {
        let config = InteractionConfig::default();
        assert_eq!(config.to_controller_config(), ControllerConfig::default());
        assert_eq!(config.to_drag_config(), DragConfig::default());
        assert_eq!(config.to_pick_config(), PickConfig::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validation_collects_every_section() {
        let mut config = InteractionConfig::default();
        config.controller.drag_threshold = -1.0;
        config.drag.smoothing = 1.5;
        config.pick.fallback_tolerance = f32::NAN;
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("controller."));
        assert!(errors[1].starts_with("drag."));
        assert!(errors[2].starts_with("pick."));
    }

    #[test]
    fn validated_wraps_problems() {
        let mut config = InteractionConfig::default();
        config.drag.smoothing = -0.1;
        let err = config.validated().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().starts_with("validation errors: drag.smoothing"));
    }

    #[cfg(feature = "config")]
    mod loading {
        use super::*;

        #[test]
        fn toml_partial_sections_keep_defaults() {
            let config = InteractionConfig::from_toml_str(
                r#"
                [controller]
                drag_threshold = 8.0

                [drag]
                unpin_delay_ms = 0
                "#,
            )
            .unwrap();
            assert_eq!(config.controller.drag_threshold, 8.0);
            assert_eq!(config.controller.hover_throttle_ms, 33);
            assert_eq!(config.to_drag_config().unpin_delay, Duration::ZERO);
            assert_eq!(config.drag.smoothing, 0.3);
            assert_eq!(config.pick, PickSection::default());
        }

        #[test]
        fn empty_documents_are_defaults() {
            assert_eq!(
                InteractionConfig::from_toml_str("").unwrap(),
                InteractionConfig::default()
            );
            assert_eq!(
                InteractionConfig::from_json_str("{}").unwrap(),
                InteractionConfig::default()
            );
        }

        #[test]
        fn json_sections() {
            let config = InteractionConfig::from_json_str(
                r#"{"pick": {"fallback_to_nearest": true, "fallback_tolerance": 2.5}}"#,
            )
            .unwrap();
            assert!(config.pick.fallback_to_nearest);
            assert_eq!(config.to_pick_config().fallback_tolerance, 2.5);
        }

        #[test]
        fn parse_errors_are_typed() {
            assert!(matches!(
                InteractionConfig::from_toml_str("[drag\nsmoothing ="),
                Err(ConfigError::Toml(_))
            ));
            assert!(matches!(
                InteractionConfig::from_json_str("{\"drag\": 3"),
                Err(ConfigError::Json(_))
            ));
            assert!(matches!(
                InteractionConfig::from_toml_file("/nonexistent/nodegrip.toml"),
                Err(ConfigError::Io(_))
            ));
        }

        #[test]
        fn toml_round_trip_through_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nodegrip.toml");
            let mut config = InteractionConfig::default();
            config.drag.smoothing = 0.5;
            config.controller.hover_throttle_ms = 16;
            std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();
            assert_eq!(InteractionConfig::from_toml_file(&path).unwrap(), config);
        }
    }
}

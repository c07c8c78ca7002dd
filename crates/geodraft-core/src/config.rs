//! Surface and coordinator configuration.

use crate::error::{DrawError, DrawResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default hover debounce window in milliseconds.
pub const DEFAULT_HOVER_DEBOUNCE_MS: u64 = 15;

/// Rendering options applied to a surface when it is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSettings {
    /// Let the camera collide with terrain.
    pub enable_collision_detection: bool,
    /// Show the frame-rate overlay.
    pub show_frame_rate: bool,
    /// Light the globe from the sun.
    pub enable_lighting: bool,
    /// Deprecated. Spin the globe with the clock.
    pub inertial_rotation: bool,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            enable_collision_detection: true,
            show_frame_rate: true,
            enable_lighting: true,
            inertial_rotation: false,
        }
    }
}

impl SurfaceSettings {
    /// Parse settings from an optional JSON object.
    ///
    /// `None` and `null` give the defaults. Anything else that is not an object
    /// is rejected.
    pub fn from_value(value: Option<&Value>) -> DrawResult<Self> {
        let settings = match value {
            None | Some(Value::Null) => Self::default(),
            Some(value @ Value::Object(_)) => Self::deserialize(value)
                .map_err(|e| DrawError::InvalidConfig(e.to_string()))?,
            Some(other) => {
                return Err(DrawError::InvalidConfig(format!(
                    "expected an object, got {other}"
                )));
            }
        };
        settings.warn_deprecated();
        Ok(settings)
    }

    pub(crate) fn warn_deprecated(&self) {
        if self.inertial_rotation {
            log::warn!("inertial_rotation is deprecated and will be removed");
        }
    }
}

/// Coordinator-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period before a hover pick runs, in milliseconds.
    pub hover_debounce_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            hover_debounce_ms: DEFAULT_HOVER_DEBOUNCE_MS,
        }
    }
}

impl CoordinatorConfig {
    pub fn hover_debounce(&self) -> Duration {
        Duration::from_millis(self.hover_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = SurfaceSettings::from_value(None).unwrap();
        assert!(settings.enable_collision_detection);
        assert!(settings.show_frame_rate);
        assert!(settings.enable_lighting);
        assert!(!settings.inertial_rotation);
        assert_eq!(SurfaceSettings::from_value(Some(&Value::Null)).unwrap(), settings);
    }

    #[test]
    fn test_partial_object() {
        let settings = SurfaceSettings::from_value(Some(&json!({ "show_frame_rate": false }))).unwrap();
        assert!(!settings.show_frame_rate);
        assert!(settings.enable_lighting);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            SurfaceSettings::from_value(Some(&json!([1, 2]))),
            Err(DrawError::InvalidConfig(_))
        ));
        assert!(matches!(
            SurfaceSettings::from_value(Some(&json!("fast"))),
            Err(DrawError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_hover_debounce_default() {
        assert_eq!(CoordinatorConfig::default().hover_debounce(), Duration::from_millis(15));
    }
}

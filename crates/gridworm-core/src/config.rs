//! Tunable canvas constants.

use crate::error::{CanvasError, CanvasResult};
use crate::snap::SnapMode;
use serde::{Deserialize, Serialize};

/// Configuration for a [`Canvas`](crate::Canvas).
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Grid spacing in canvas units.
    pub grid_size: f64,
    /// Maximum per-axis distance at which an item snaps to a neighbor.
    pub snap_distance: f64,
    /// Which snap passes run while dragging.
    pub snap_mode: SnapMode,
    /// Floor applied to item width and height on every resize.
    pub min_item_size: f64,
    /// Offset applied to duplicated items on both axes.
    pub duplicate_offset: f64,
    /// Offset between consecutive files of a multi-file drop.
    pub drop_cascade_offset: f64,
    /// Eraser hit radius in canvas units.
    pub eraser_radius: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Additive step used by the toolbar zoom buttons.
    pub zoom_step: f64,
    /// Rotation increment used while Shift is held.
    pub rotation_snap_degrees: f64,
    pub nudge_small: f64,
    pub nudge_large: f64,
    /// Screen-space radius used to close a pen path or polygon.
    pub close_radius_screen: f64,
    /// Lower bound for the close radius in canvas units.
    pub close_radius_min: f64,
    /// Screen-space radius for picking an existing bezier anchor.
    pub anchor_pick_radius: f64,
    /// Maximum number of undo states to keep.
    pub max_history: usize,
    pub double_click_ms: u64,
    pub double_click_distance: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            snap_distance: 10.0,
            snap_mode: SnapMode::GridAndNeighbors,
            min_item_size: 50.0,
            duplicate_offset: 20.0,
            drop_cascade_offset: 20.0,
            eraser_radius: 10.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 0.1,
            rotation_snap_degrees: 15.0,
            nudge_small: 1.0,
            nudge_large: 10.0,
            close_radius_screen: 30.0,
            close_radius_min: 20.0,
            anchor_pick_radius: 8.0,
            max_history: 50,
            double_click_ms: 500,
            double_click_distance: 5.0,
        }
    }
}

impl CanvasConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(CanvasError::Config)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string_pretty(self).map_err(CanvasError::Config)
    }

    fn validate(&self) -> CanvasResult<()> {
        if self.grid_size <= 0.0 {
            return Err(CanvasError::InvalidConfig("grid_size must be positive".into()));
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(CanvasError::InvalidConfig(format!(
                "zoom range [{}, {}] is empty",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.min_item_size <= 0.0 {
            return Err(CanvasError::InvalidConfig("min_item_size must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::new();
        assert!((config.grid_size - 20.0).abs() < f64::EPSILON);
        assert!((config.min_item_size - 50.0).abs() < f64::EPSILON);
        assert!((config.eraser_radius - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.max_history, 50);
        assert_eq!(config.snap_mode, SnapMode::GridAndNeighbors);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CanvasConfig::from_json(r#"{ "grid_size": 25.0 }"#).unwrap();
        assert!((config.grid_size - 25.0).abs() < f64::EPSILON);
        assert!((config.snap_distance - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CanvasConfig::from_json("not json"),
            Err(CanvasError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_zoom_range() {
        let result = CanvasConfig::from_json(r#"{ "min_zoom": 4.0, "max_zoom": 2.0 }"#);
        assert!(matches!(result, Err(CanvasError::InvalidConfig(_))));
    }

    #[test]
    fn test_roundtrip() {
        let config = CanvasConfig {
            snap_mode: SnapMode::Grid,
            ..CanvasConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(CanvasConfig::from_json(&json).unwrap(), config);
    }
}

//! Configuration for the geometry solver

use serde::{Deserialize, Serialize};

use super::types::ComponentClass;

/// Footprints, clearances and limits used when placing components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Keep-out distance from both ends of the frame for automatic placement
    pub edge_clearance: f64,

    /// Minimum gap between the footprints of two interacting components
    pub min_clearance: f64,

    /// Footprint length of a hinge along the frame height
    pub hinge_length: f64,

    /// Footprint length of the lock
    pub lock_length: f64,

    /// Footprint length of each mounting point, by index
    pub pm_lengths: [f64; 4],

    /// Height at which an automatic lock is placed, measured from the bottom of the frame
    pub lock_height: f64,

    /// Centre an automatic lock in the usable span instead of using `lock_height`
    pub center_lock: bool,

    /// Smallest accepted frame height
    pub min_frame_height: f64,

    /// Largest accepted frame height
    pub max_frame_height: f64,

    /// Door width cap used to derive the default Y offset
    pub y_offset_cap: f64,

    /// Only check collisions between components on a common jamb, so hinges
    /// and the lock never collide; off by default
    pub separate_jambs: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            edge_clearance: 50.0,
            min_clearance: 10.0,
            hinge_length: 100.0,
            lock_length: 240.0,
            pm_lengths: [265.0, 140.0, 175.0, 240.0],
            lock_height: 1050.0,
            center_lock: false,
            min_frame_height: 840.0,
            max_frame_height: 2500.0,
            y_offset_cap: 45.0,
            separate_jambs: false,
        }
    }
}

impl GeometryConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edge_clearance(mut self, clearance: f64) -> Self {
        self.edge_clearance = clearance;
        self
    }

    pub fn with_min_clearance(mut self, clearance: f64) -> Self {
        self.min_clearance = clearance;
        self
    }

    pub fn with_hinge_length(mut self, length: f64) -> Self {
        self.hinge_length = length;
        self
    }

    /// Place automatic locks at `height` from the bottom of the frame
    pub fn with_lock_height(mut self, height: f64) -> Self {
        self.lock_height = height;
        self.center_lock = false;
        self
    }

    /// Centre automatic locks in the usable span
    pub fn with_centered_lock(mut self) -> Self {
        self.center_lock = true;
        self
    }

    /// Skip collision checks between components on opposite jambs
    pub fn with_separate_jambs(mut self) -> Self {
        self.separate_jambs = true;
        self
    }

    pub fn with_frame_height_limits(mut self, min: f64, max: f64) -> Self {
        self.min_frame_height = min;
        self.max_frame_height = max;
        self
    }

    /// Footprint length of the `index`-th (1-based) component of a class
    pub fn footprint(&self, class: ComponentClass, index: usize) -> f64 {
        match class {
            ComponentClass::Frame => 0.0,
            ComponentClass::Hinge => self.hinge_length,
            ComponentClass::Lock => self.lock_length,
            ComponentClass::Pm => self
                .pm_lengths
                .get(index.saturating_sub(1))
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// Default lock and hinge Y offset for a frame
    pub fn auto_y_offset(&self, frame_width: f64, door_width: f64) -> f64 {
        frame_width - door_width.min(self.y_offset_cap) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeometryConfig::default();
        assert_eq!(config.edge_clearance, 50.0);
        assert_eq!(config.hinge_length, 100.0);
        assert_eq!(config.lock_length, 240.0);
        assert_eq!(config.pm_lengths, [265.0, 140.0, 175.0, 240.0]);
        assert_eq!(config.lock_height, 1050.0);
        assert_eq!((config.min_frame_height, config.max_frame_height), (840.0, 2500.0));
        assert!(!config.separate_jambs);
    }

    #[test]
    fn test_builder_pattern() {
        let config = GeometryConfig::new()
            .with_edge_clearance(20.0)
            .with_centered_lock()
            .with_frame_height_limits(0.0, 4000.0);
        assert_eq!(config.edge_clearance, 20.0);
        assert!(config.center_lock);
        assert_eq!(config.max_frame_height, 4000.0);
    }

    #[test]
    fn test_footprints() {
        let config = GeometryConfig::default();
        assert_eq!(config.footprint(ComponentClass::Hinge, 3), 100.0);
        assert_eq!(config.footprint(ComponentClass::Pm, 2), 140.0);
        assert_eq!(config.footprint(ComponentClass::Pm, 4), 240.0);
    }

    #[test]
    fn test_auto_y_offset() {
        let config = GeometryConfig::default();
        assert_eq!(config.auto_y_offset(60.0, 40.0), 40.0);
        // door width is capped at 45
        assert_eq!(config.auto_y_offset(60.0, 55.0), 37.5);
    }

    #[test]
    fn test_from_toml() {
        let config: GeometryConfig = toml::from_str(
            r#"
            edge_clearance = 80
            pm_lengths = [200, 100, 100, 200]
            center_lock = true
            "#,
        )
        .unwrap();
        assert_eq!(config.edge_clearance, 80.0);
        assert_eq!(config.pm_lengths, [200.0, 100.0, 100.0, 200.0]);
        assert!(config.center_lock);
        assert_eq!(config.min_clearance, 10.0);
    }
}

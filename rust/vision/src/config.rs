// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detection parameters
//!
//! Every threshold the pipeline uses lives here. A JSON file may override
//! any subset of fields; missing fields keep their defaults.

use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the whole layout detection pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Grayscale level at or below which a pixel counts as ink
    pub threshold: u8,
    /// Probabilistic Hough transform parameters
    pub hough: HoughConfig,
    /// Pixel to meter mapping and wall output
    pub canvas: CanvasConfig,
    /// Bounding box rule for door candidates
    pub doors: OpeningRule,
    /// Bounding box rule for window candidates
    pub windows: OpeningRule,
    /// Polygon approximation tolerance as a fraction of contour perimeter
    pub polygon_epsilon: f64,
    /// Keep only openings whose center lies within this many meters of a
    /// detected wall. `None` disables the filter.
    pub max_wall_distance: Option<f64>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 127,
            hough: HoughConfig::default(),
            canvas: CanvasConfig::default(),
            doors: OpeningRule {
                min_aspect: 1.5,
                max_aspect: 4.0,
                min_area: 100,
                max_area: 2000,
            },
            windows: OpeningRule {
                min_aspect: 0.7,
                max_aspect: 1.5,
                min_area: 50,
                max_area: 1500,
            },
            polygon_epsilon: 0.02,
            max_wall_distance: None,
        }
    }
}

/// Probabilistic Hough line detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughConfig {
    /// Distance resolution of the accumulator (pixels)
    pub rho: f64,
    /// Angular resolution of the accumulator (radians)
    pub theta: f64,
    /// Minimum accumulator votes for a line
    pub threshold: u32,
    /// Minimum segment extent along x or y (pixels)
    pub min_line_length: f64,
    /// Maximum gap bridged within one segment (pixels)
    pub max_line_gap: f64,
    /// Stop after this many segments; `None` keeps every segment
    pub max_lines: Option<usize>,
    /// Seed for the pixel visiting order
    pub seed: u64,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            rho: 1.0,
            theta: std::f64::consts::PI / 180.0,
            threshold: 50,
            min_line_length: 30.0,
            max_line_gap: 10.0,
            max_lines: None,
            seed: 0,
        }
    }
}

/// Output canvas in meters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Side length of the canvas the whole image maps onto (meters)
    pub scale: f64,
    /// Thickness reported for every wall (meters)
    pub wall_thickness: f64,
    /// Walls at or below this length are dropped as noise (meters)
    pub min_wall_length: f64,
    /// Fallback room width (meters)
    pub fallback_width: f64,
    /// Fallback room height (meters)
    pub fallback_height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            scale: 10.0,
            wall_thickness: 0.2,
            min_wall_length: 0.5,
            fallback_width: 8.0,
            fallback_height: 6.0,
        }
    }
}

/// Open-interval bounding box rule used to classify an opening
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningRule {
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Pixel area, exclusive
    pub min_area: u64,
    /// Pixel area, exclusive
    pub max_area: u64,
}

impl OpeningRule {
    /// Both bounds are strict
    pub fn matches(&self, aspect_ratio: f64, area: u64) -> bool {
        self.min_aspect < aspect_ratio
            && aspect_ratio < self.max_aspect
            && self.min_area < area
            && area < self.max_area
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min_aspect.is_finite() && self.max_aspect.is_finite())
            || self.min_aspect >= self.max_aspect
        {
            return Err(VisionError::InvalidConfig(format!(
                "{name} aspect range ({}, {}) is empty",
                self.min_aspect, self.max_aspect
            )));
        }
        if self.min_area >= self.max_area {
            return Err(VisionError::InvalidConfig(format!(
                "{name} area range ({}, {}) is empty",
                self.min_area, self.max_area
            )));
        }
        Ok(())
    }
}

impl DetectionConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| VisionError::InvalidConfig(format!("JSON error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            VisionError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Reject parameter sets the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(VisionError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };

        positive("hough.rho", self.hough.rho)?;
        positive("hough.theta", self.hough.theta)?;
        positive("canvas.scale", self.canvas.scale)?;
        positive("canvas.wall_thickness", self.canvas.wall_thickness)?;
        positive("canvas.fallback_width", self.canvas.fallback_width)?;
        positive("canvas.fallback_height", self.canvas.fallback_height)?;

        if self.hough.threshold == 0 {
            return Err(VisionError::InvalidConfig(
                "hough.threshold must be at least 1".into(),
            ));
        }
        if self.hough.theta > std::f64::consts::PI {
            return Err(VisionError::InvalidConfig(format!(
                "hough.theta must not exceed pi, got {}",
                self.hough.theta
            )));
        }
        if !(self.hough.min_line_length >= 0.0 && self.hough.max_line_gap >= 0.0) {
            return Err(VisionError::InvalidConfig(
                "hough line length and gap must be non-negative".into(),
            ));
        }
        if !(self.canvas.min_wall_length >= 0.0) {
            return Err(VisionError::InvalidConfig(
                "canvas.min_wall_length must be non-negative".into(),
            ));
        }
        if !(self.polygon_epsilon > 0.0 && self.polygon_epsilon < 1.0) {
            return Err(VisionError::InvalidConfig(format!(
                "polygon_epsilon must lie in (0, 1), got {}",
                self.polygon_epsilon
            )));
        }
        if let Some(distance) = self.max_wall_distance {
            if !(distance.is_finite() && distance >= 0.0) {
                return Err(VisionError::InvalidConfig(format!(
                    "max_wall_distance must be non-negative, got {distance}"
                )));
            }
        }

        self.doors.validate("doors")?;
        self.windows.validate("windows")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = DetectionConfig::default();
        assert_eq!(config.threshold, 127);
        assert_eq!(config.hough.threshold, 50);
        assert_eq!(config.hough.min_line_length, 30.0);
        assert_eq!(config.hough.max_line_gap, 10.0);
        assert_eq!(config.hough.max_lines, None);
        assert_eq!(config.canvas.scale, 10.0);
        assert_eq!(config.canvas.wall_thickness, 0.2);
        assert_eq!(config.polygon_epsilon, 0.02);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config =
            DetectionConfig::from_json_str(r#"{"threshold": 100, "hough": {"threshold": 20}}"#)
                .unwrap();
        assert_eq!(config.threshold, 100);
        assert_eq!(config.hough.threshold, 20);
        assert_eq!(config.hough.min_line_length, 30.0);
        assert_eq!(config.doors, DetectionConfig::default().doors);

        let capped = DetectionConfig::from_json_str(r#"{"hough": {"max_lines": 8}}"#).unwrap();
        assert_eq!(capped.hough.max_lines, Some(8));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        let mut config = DetectionConfig::default();
        config.canvas.scale = 0.0;
        assert!(matches!(
            config.validate(),
            Err(VisionError::InvalidConfig(_))
        ));

        let mut config = DetectionConfig::default();
        config.windows.min_aspect = 2.0;
        assert!(config.validate().is_err());

        let mut config = DetectionConfig::default();
        config.polygon_epsilon = 1.5;
        assert!(config.validate().is_err());

        assert!(DetectionConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_opening_rule_bounds_are_strict() {
        let rule = DetectionConfig::default().doors;
        assert!(rule.matches(2.0, 500));
        assert!(!rule.matches(1.5, 500));
        assert!(!rule.matches(4.0, 500));
        assert!(!rule.matches(2.0, 100));
        assert!(!rule.matches(2.0, 2000));
    }
}

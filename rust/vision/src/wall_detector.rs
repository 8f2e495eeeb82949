// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall detection for floor plan recognition

use crate::config::{CanvasConfig, DetectionConfig};
use crate::hough::detect_line_segments;
use crate::normalize::{round2, CanvasNormalizer};
use crate::types::{DetectedLine, Point2D, WallSegment};
use image::GrayImage;

/// Walls found in one image
#[derive(Debug, Clone, PartialEq)]
pub struct WallDetection {
    pub walls: Vec<WallSegment>,
    /// True when nothing survived detection and `walls` is the default room
    pub used_fallback: bool,
}

/// Main wall detection pipeline
///
/// Runs the probabilistic Hough transform over the binary image, maps each
/// segment onto the meter canvas and drops segments no longer than
/// `canvas.min_wall_length`. When nothing is left, the default room is
/// returned instead so callers always receive a closed shape.
pub fn detect_walls(binary: &GrayImage, config: &DetectionConfig) -> WallDetection {
    let raw_lines = detect_line_segments(binary, &config.hough);

    let normalizer = CanvasNormalizer::new(binary.width(), binary.height(), config.canvas.scale);
    let walls = lines_to_walls(&raw_lines, &normalizer, &config.canvas);

    let longest_px = raw_lines.iter().map(DetectedLine::length).fold(0.0, f64::max);
    tracing::debug!(
        raw_segments = raw_lines.len(),
        longest_px,
        walls = walls.len(),
        "Wall detection finished"
    );

    if walls.is_empty() {
        tracing::warn!(
            raw_segments = raw_lines.len(),
            "No walls detected, substituting default room"
        );
        return WallDetection {
            walls: default_room(&config.canvas),
            used_fallback: true,
        };
    }

    WallDetection {
        walls,
        used_fallback: false,
    }
}

/// Normalize pixel segments into walls, filtering noise
pub fn lines_to_walls(
    lines: &[DetectedLine],
    normalizer: &CanvasNormalizer,
    canvas: &CanvasConfig,
) -> Vec<WallSegment> {
    lines
        .iter()
        .filter_map(|line| {
            let start = normalizer.point(&line.start);
            let end = normalizer.point(&line.end);

            // Length is measured before rounding
            if start.distance_to(&end) <= canvas.min_wall_length {
                return None;
            }

            Some(WallSegment::new(
                Point2D::new(round2(start.x), round2(start.y)),
                Point2D::new(round2(end.x), round2(end.y)),
                round2(canvas.wall_thickness),
            ))
        })
        .collect()
}

/// Axis-aligned rectangular room anchored at the origin, rounded like
/// detected walls
pub fn default_room(canvas: &CanvasConfig) -> Vec<WallSegment> {
    let w = round2(canvas.fallback_width);
    let h = round2(canvas.fallback_height);
    let t = round2(canvas.wall_thickness);

    vec![
        WallSegment::new(Point2D::new(0.0, 0.0), Point2D::new(w, 0.0), t),
        WallSegment::new(Point2D::new(w, 0.0), Point2D::new(w, h), t),
        WallSegment::new(Point2D::new(w, h), Point2D::new(0.0, h), t),
        WallSegment::new(Point2D::new(0.0, h), Point2D::new(0.0, 0.0), t),
    ]
}

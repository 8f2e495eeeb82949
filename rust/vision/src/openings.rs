// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door and window classification from contour shapes
//!
//! Both classifiers look at the bounding box of every outer contour. Doors
//! are elongated boxes; windows are near-square boxes whose contour
//! approximates to a quadrilateral. Rotation is not estimated.

use crate::config::{DetectionConfig, OpeningRule};
use crate::contours::Contour;
use crate::normalize::{round2, CanvasNormalizer};
use crate::types::{BoundingBox, Door, Point2D, WallSegment, Window};
use crate::wall_detector::WallDetection;

/// Bounding box test shared by both classifiers
///
/// A box without height has aspect ratio 0 and never matches.
pub fn matches_rule(bbox: &BoundingBox, rule: &OpeningRule) -> bool {
    rule.matches(bbox.aspect_ratio(), bbox.area())
}

/// Classify contours as doors
pub fn detect_doors(
    contours: &[Contour],
    normalizer: &CanvasNormalizer,
    walls: &WallDetection,
    config: &DetectionConfig,
) -> Vec<Door> {
    let doors: Vec<Door> = contours
        .iter()
        .filter_map(Contour::bounding_box)
        .filter(|bbox| matches_rule(bbox, &config.doors))
        .map(|bbox| Door {
            position: box_center(&bbox, normalizer),
            width: round2(normalizer.x(bbox.width as f64)),
            rotation: 0.0,
        })
        .filter(|door| near_walls(&door.position, walls, config.max_wall_distance))
        .collect();

    tracing::debug!(candidates = contours.len(), doors = doors.len(), "Door classification finished");
    doors
}

/// Classify quadrilateral contours as windows
pub fn detect_windows(
    contours: &[Contour],
    normalizer: &CanvasNormalizer,
    walls: &WallDetection,
    config: &DetectionConfig,
) -> Vec<Window> {
    let windows: Vec<Window> = contours
        .iter()
        .filter(|contour| contour.approximate_polygon(config.polygon_epsilon).len() == 4)
        .filter_map(Contour::bounding_box)
        .filter(|bbox| matches_rule(bbox, &config.windows))
        .map(|bbox| Window {
            position: box_center(&bbox, normalizer),
            width: round2(normalizer.x(bbox.width as f64)),
            height: round2(normalizer.y(bbox.height as f64)),
            rotation: 0.0,
        })
        .filter(|window| near_walls(&window.position, walls, config.max_wall_distance))
        .collect();

    tracing::debug!(
        candidates = contours.len(),
        windows = windows.len(),
        "Window classification finished"
    );
    windows
}

fn box_center(bbox: &BoundingBox, normalizer: &CanvasNormalizer) -> Point2D {
    let (cx, cy) = bbox.center();
    normalizer.rounded_point(&Point2D::new(cx, cy))
}

/// Whether an opening passes the wall-proximity filter
///
/// The filter only applies to detected walls; with no limit configured or
/// with the fallback room every opening passes.
pub fn near_walls(position: &Point2D, walls: &WallDetection, max_distance: Option<f64>) -> bool {
    match max_distance {
        None => true,
        Some(_) if walls.used_fallback => true,
        Some(limit) => walls
            .walls
            .iter()
            .any(|wall| distance_to_wall(position, wall) <= limit),
    }
}

/// Distance from a point to the closest point of a wall's centerline
pub fn distance_to_wall(point: &Point2D, wall: &WallSegment) -> f64 {
    let p = point.to_nalgebra();
    let a = wall.start.to_nalgebra();
    let ab = wall.end.to_nalgebra() - a;

    let length_sq = ab.norm_squared();
    if length_sq < 1e-12 {
        return (p - a).norm();
    }

    let t = ((p - a).dot(&ab) / length_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan layout detection

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A 2D point, serialized as a `[x, y]` pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

/// Line segment found by the Hough transform, in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedLine {
    pub start: Point2D,
    pub end: Point2D,
}

impl DetectedLine {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// Axis-aligned bounding box of a contour, in pixels
///
/// `width` and `height` count pixels inclusively, so a single pixel is 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Width over height; 0 for a box with no height
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center in pixel coordinates
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }
}

/// Straight wall segment in meters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WallSegment {
    pub start: Point2D,
    pub end: Point2D,
    pub thickness: f64,
}

impl WallSegment {
    pub fn new(start: Point2D, end: Point2D, thickness: f64) -> Self {
        Self {
            start,
            end,
            thickness,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}

/// Door opening, positioned at its center
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Door {
    pub position: Point2D,
    pub width: f64,
    /// Always 0; angled openings are not detected
    pub rotation: f64,
}

/// Window opening, positioned at its center
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Window {
    pub position: Point2D,
    pub width: f64,
    pub height: f64,
    /// Always 0; angled openings are not detected
    pub rotation: f64,
}

/// Complete detection result for one floor plan image
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutRecord {
    pub walls: Vec<WallSegment>,
    pub doors: Vec<Door>,
    pub windows: Vec<Window>,
    /// True when `walls` is the synthetic fallback room rather than detected geometry
    pub used_fallback: bool,
}

impl LayoutRecord {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

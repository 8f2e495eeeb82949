// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pixel to meter mapping
//!
//! The whole image maps onto a square canvas of `scale` meters per side,
//! whatever its pixel aspect ratio: x is divided by the image width and y by
//! the image height.

use crate::types::Point2D;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Maps pixel coordinates of one image onto the meter canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasNormalizer {
    width: f64,
    height: f64,
    scale: f64,
}

impl CanvasNormalizer {
    /// `width` and `height` must be non-zero
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
            scale,
        }
    }

    pub fn x(&self, px: f64) -> f64 {
        px / self.width * self.scale
    }

    pub fn y(&self, py: f64) -> f64 {
        py / self.height * self.scale
    }

    pub fn point(&self, p: &Point2D) -> Point2D {
        Point2D::new(self.x(p.x), self.y(p.y))
    }

    /// Normalized point rounded for output
    pub fn rounded_point(&self, p: &Point2D) -> Point2D {
        Point2D::new(round2(self.x(p.x)), round2(self.y(p.y)))
    }
}

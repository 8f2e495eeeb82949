// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan layout detection
//!
//! This crate turns a raster floor plan into walls, doors and windows in
//! meters:
//! 1. Binarize the image (dark strokes become foreground)
//! 2. Detect walls with a probabilistic Hough transform
//! 3. Classify door and window shapes from outer contours
//! 4. Map everything onto a fixed meter canvas
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorplan_lite_vision::{load_image, DetectionConfig, ImageSource, LayoutDetector};
//!
//! let image = load_image(&ImageSource::Path("plan.png".into()))?;
//! let detector = LayoutDetector::new(DetectionConfig::default())?;
//! let layout = detector.detect(&image)?;
//! println!("{}", layout.to_json()?);
//! ```

pub mod acquire;
pub mod config;
pub mod contours;
pub mod error;
pub mod hough;
pub mod image_ops;
pub mod normalize;
pub mod openings;
pub mod types;
pub mod wall_detector;

// Re-export commonly used types and functions
pub use acquire::{load_image, ImageSource};
pub use config::{CanvasConfig, DetectionConfig, HoughConfig, OpeningRule};
pub use error::{AcquisitionError, Result, VisionError};
pub use image_ops::binarize;
pub use types::{Door, LayoutRecord, Point2D, WallSegment, Window};
pub use wall_detector::{detect_walls, WallDetection};

use contours::find_external_contours;
use image::RgbImage;
use image_ops::ink_count;
use normalize::CanvasNormalizer;
use openings::{detect_doors, detect_windows};
use std::time::Instant;

/// Layout detector bound to a validated configuration
///
/// Holds no mutable state; one detector can serve any number of images,
/// including from several threads.
#[derive(Debug, Clone)]
pub struct LayoutDetector {
    config: DetectionConfig,
}

impl LayoutDetector {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run the full detection pipeline on one image
    ///
    /// Either a complete layout is returned or an error; there are no
    /// partial results.
    pub fn detect(&self, image: &RgbImage) -> Result<LayoutRecord> {
        let started = Instant::now();
        let binary = binarize(image, self.config.threshold)?;
        let (width, height) = binary.dimensions();
        tracing::debug!(width, height, ink = ink_count(&binary), "Binarized image");

        // Step 1: Walls
        let walls = detect_walls(&binary, &self.config);

        // Step 2: Openings from outer contours
        let contours = find_external_contours(&binary);
        tracing::debug!(contours = contours.len(), "Extracted outer contours");

        let normalizer = CanvasNormalizer::new(width, height, self.config.canvas.scale);
        let doors = detect_doors(&contours, &normalizer, &walls, &self.config);
        let windows = detect_windows(&contours, &normalizer, &walls, &self.config);

        tracing::info!(
            width,
            height,
            walls = walls.walls.len(),
            doors = doors.len(),
            windows = windows.len(),
            used_fallback = walls.used_fallback,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Layout detection complete"
        );

        Ok(LayoutRecord {
            walls: walls.walls,
            doors,
            windows,
            used_fallback: walls.used_fallback,
        })
    }
}

/// Detect the layout of an RGB floor plan image
pub fn detect_layout(image: &RgbImage, config: &DetectionConfig) -> Result<LayoutRecord> {
    LayoutDetector::new(config.clone())?.detect(image)
}

/// Detect the layout from packed RGB bytes (3 bytes per pixel, row-major)
pub fn detect_layout_from_rgb(
    rgb_data: &[u8],
    width: u32,
    height: u32,
    config: &DetectionConfig,
) -> Result<LayoutRecord> {
    let expected = width as usize * height as usize * 3;
    if rgb_data.len() != expected {
        return Err(VisionError::InvalidImage(format!(
            "expected {} bytes for {}x{} RGB, got {}",
            expected,
            width,
            height,
            rgb_data.len()
        )));
    }

    let image = RgbImage::from_raw(width, height, rgb_data.to_vec()).ok_or_else(|| {
        VisionError::InvalidImage(format!("cannot build {}x{} RGB buffer", width, height))
    })?;
    detect_layout(&image, config)
}

/// Load an image and detect its layout
pub fn detect_layout_from_source(
    source: &ImageSource,
    config: &DetectionConfig,
) -> Result<LayoutRecord> {
    let image = load_image(source)?;
    detect_layout(&image, config)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binarization of floor plan images

use crate::error::{Result, VisionError};
use image::{GrayImage, Luma, RgbImage};

/// Foreground value in binary images
pub const INK: u8 = 255;
/// Background value in binary images
pub const PAPER: u8 = 0;

/// Convert an RGB image to grayscale
pub fn rgb_to_grayscale(rgb: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(rgb.width(), rgb.height());

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        // Standard luminance formula (ITU-R BT.601)
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        gray.put_pixel(x, y, Luma([luma.round().min(255.0) as u8]));
    }

    gray
}

/// Inverted binary threshold: pixels at or below `threshold_value` become ink
pub fn threshold_inverted(image: &GrayImage, threshold_value: u8) -> GrayImage {
    let mut result = GrayImage::new(image.width(), image.height());

    for (x, y, pixel) in image.enumerate_pixels() {
        let value = if pixel.0[0] > threshold_value { PAPER } else { INK };
        result.put_pixel(x, y, Luma([value]));
    }

    result
}

/// Reduce a color image to ink/paper so drawn lines become foreground
pub fn binarize(image: &RgbImage, threshold_value: u8) -> Result<GrayImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(VisionError::InvalidImage(format!(
            "image is empty ({}x{})",
            image.width(),
            image.height()
        )));
    }

    let gray = rgb_to_grayscale(image);
    Ok(threshold_inverted(&gray, threshold_value))
}

/// Number of ink pixels in a binary image
pub fn ink_count(binary: &GrayImage) -> usize {
    binary.pixels().filter(|p| p.0[0] != PAPER).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_threshold_inverted() {
        let mut img = GrayImage::new(10, 10);
        for x in 0..10 {
            for y in 0..10 {
                let value = match x {
                    0..=3 => 100,
                    4 => 127,
                    5 => 128,
                    _ => 200,
                };
                img.put_pixel(x, y, Luma([value]));
            }
        }

        let result = threshold_inverted(&img, 127);

        assert_eq!(result.get_pixel(0, 0).0[0], INK);
        assert_eq!(result.get_pixel(4, 0).0[0], INK);
        assert_eq!(result.get_pixel(5, 0).0[0], PAPER);
        assert_eq!(result.get_pixel(9, 0).0[0], PAPER);
    }

    #[test]
    fn test_rgb_to_grayscale() {
        let mut rgb = RgbImage::new(4, 1);
        rgb.put_pixel(0, 0, Rgb([255, 255, 255]));
        rgb.put_pixel(1, 0, Rgb([0, 0, 0]));
        rgb.put_pixel(2, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(3, 0, Rgb([0, 255, 0]));

        let gray = rgb_to_grayscale(&rgb);

        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
        assert_eq!(gray.get_pixel(2, 0).0[0], 76);
        assert_eq!(gray.get_pixel(3, 0).0[0], 150);
    }

    #[test]
    fn test_binarize_marks_dark_strokes() {
        let mut rgb = RgbImage::from_pixel(3, 3, Rgb([255, 255, 255]));
        rgb.put_pixel(1, 1, Rgb([20, 20, 20]));
        // Pure red is darker than mid-gray after luminance weighting
        rgb.put_pixel(2, 2, Rgb([255, 0, 0]));

        let binary = binarize(&rgb, 127).unwrap();

        assert_eq!(binary.dimensions(), (3, 3));
        assert_eq!(binary.get_pixel(1, 1).0[0], INK);
        assert_eq!(binary.get_pixel(2, 2).0[0], INK);
        assert_eq!(binary.get_pixel(0, 0).0[0], PAPER);
        assert_eq!(ink_count(&binary), 2);
    }

    #[test]
    fn test_binarize_rejects_empty_image() {
        let rgb = RgbImage::new(0, 5);
        assert!(matches!(
            binarize(&rgb, 127),
            Err(VisionError::InvalidImage(_))
        ));
    }
}

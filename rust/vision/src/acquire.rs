// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loading floor plan images from files, raw bytes or base64 payloads

use crate::error::AcquisitionError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageReader, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Where an image comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    /// Encoded image file contents (PNG, JPEG, GIF, BMP)
    Bytes(Vec<u8>),
    /// Base64 payload, optionally prefixed with a data URL header
    Base64(String),
}

/// Decode an image into 8-bit RGB
pub fn load_image(source: &ImageSource) -> Result<RgbImage, AcquisitionError> {
    match source {
        ImageSource::Path(path) => load_from_path(path),
        ImageSource::Bytes(bytes) => load_from_bytes(bytes),
        ImageSource::Base64(payload) => load_from_base64(payload),
    }
}

pub fn load_from_path(path: &Path) -> Result<RgbImage, AcquisitionError> {
    if !path.exists() {
        return Err(AcquisitionError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), size = bytes.len(), "Read image file");
    load_from_bytes(&bytes)
}

pub fn load_from_bytes(bytes: &[u8]) -> Result<RgbImage, AcquisitionError> {
    if bytes.is_empty() {
        return Err(AcquisitionError::Empty);
    }

    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;

    Ok(image.to_rgb8())
}

/// Decode base64 image data
///
/// Everything up to the last comma is discarded so `data:image/png;base64,...`
/// URLs can be passed directly.
pub fn load_from_base64(payload: &str) -> Result<RgbImage, AcquisitionError> {
    let encoded = payload.rsplit(',').next().unwrap_or(payload).trim();
    let bytes = STANDARD.decode(encoded)?;
    load_from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    fn png_bytes() -> Vec<u8> {
        let mut img = RgbImage::from_pixel(4, 3, Rgb([255, 255, 255]));
        img.put_pixel(1, 1, Rgb([0, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_load_png_bytes() {
        let img = load_from_bytes(&png_bytes()).unwrap();

        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_load_data_url() {
        let payload = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes()));

        let img = load_image(&ImageSource::Base64(payload)).unwrap();

        assert_eq!(img.dimensions(), (4, 3));
    }

    #[test]
    fn test_acquisition_errors() {
        assert!(matches!(
            load_from_bytes(&[]),
            Err(AcquisitionError::Empty)
        ));
        assert!(matches!(
            load_from_bytes(b"definitely not an image"),
            Err(AcquisitionError::Decode(_))
        ));
        assert!(matches!(
            load_from_base64("***"),
            Err(AcquisitionError::Base64(_))
        ));
        assert!(matches!(
            load_image(&ImageSource::Path(PathBuf::from("/nonexistent/plan.png"))),
            Err(AcquisitionError::NotFound(_))
        ));
    }
}

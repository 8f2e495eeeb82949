// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for layout detection and image acquisition

use std::path::PathBuf;
use thiserror::Error;

/// Result type for layout detection
pub type Result<T> = std::result::Result<T, VisionError>;

/// Errors that abort a layout detection request
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid detection config: {0}")]
    InvalidConfig(String),

    #[error("Image acquisition failed: {0}")]
    Acquisition(#[from] AcquisitionError),
}

/// Errors raised while obtaining a decoded image
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image data is empty")]
    Empty,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VisionError::InvalidImage("image has zero height".into());
        assert_eq!(err.to_string(), "Invalid image: image has zero height");

        let err: VisionError = AcquisitionError::NotFound(PathBuf::from("plan.png")).into();
        assert_eq!(
            err.to_string(),
            "Image acquisition failed: Image not found: plan.png"
        );
    }
}

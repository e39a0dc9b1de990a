//! Content-based image format detection.
//!
//! The format tag comes from the file's leading bytes, never from its
//! extension, so a renamed PNG is still treated as a PNG. A matching
//! signature is not enough on its own: the header must also decode.

use crate::error::{OptimizeError, Result};
use image::{ImageFormat, ImageReader};
use std::path::Path;

/// Classifies the file at `path`.
///
/// # Returns
/// * `Ok(format)` - The container format recognised from the file header
/// * `Err(OptimizeError::NotAnImage)` - The file cannot be opened, matches no image
///   signature, or its header does not decode
pub fn detect(path: &Path) -> Result<ImageFormat> {
    let not_an_image = || OptimizeError::NotAnImage(path.to_path_buf());

    let reader = ImageReader::open(path)
        .map_err(|_| not_an_image())?
        .with_guessed_format()
        .map_err(|_| not_an_image())?;

    let format = reader.format().ok_or_else(not_an_image)?;
    reader.into_dimensions().map_err(|_| not_an_image())?;

    Ok(format)
}

/// Upper-case label used in progress output, e.g. `JPEG`, `PNG`, `GIF`.
pub fn format_label(format: ImageFormat) -> String {
    format!("{:?}", format).to_uppercase()
}

//! Maps a detected format to the optimizer that handles it.
//!
//! Only JPEG and PNG are optimized. Every other recognised format resolves to
//! `OptimizeError::UnsupportedFormat`, which the walker reports as a skip.

use crate::config::Config;
use crate::error::{OptimizeError, Result};
use crate::formats::format_label;
use crate::jpeg::JpegOptimizer;
use crate::tinypng::TinyPngOptimizer;
use image::ImageFormat;
use std::fmt;
use std::path::Path;

/// An in-place size optimizer for one image format.
pub trait Optimizer {
    /// Optimizes `input` and writes the result to `output`, which may be the
    /// same path.
    fn optimize(&self, input: &Path, output: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    Jpeg,
    Png,
}

impl SupportedFormat {
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(SupportedFormat::Jpeg),
            ImageFormat::Png => Some(SupportedFormat::Png),
            _ => None,
        }
    }
}

impl fmt::Display for SupportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportedFormat::Jpeg => f.write_str("JPEG"),
            SupportedFormat::Png => f.write_str("PNG"),
        }
    }
}

pub struct OptimizerRegistry {
    jpeg: Box<dyn Optimizer>,
    png: Box<dyn Optimizer>,
}

impl OptimizerRegistry {
    pub fn new(jpeg: Box<dyn Optimizer>, png: Box<dyn Optimizer>) -> Self {
        Self { jpeg, png }
    }

    /// Builds the production registry: local JPEG re-encoding and the TinyPNG
    /// client for PNG.
    pub fn from_config(config: Config) -> Result<Self> {
        let jpeg = JpegOptimizer::new(config.jpeg_quality);
        let png = TinyPngOptimizer::new(config.shrink)?;
        Ok(Self::new(Box::new(jpeg), Box::new(png)))
    }

    pub fn resolve(&self, format: ImageFormat) -> Result<(SupportedFormat, &dyn Optimizer)> {
        match SupportedFormat::from_image_format(format) {
            Some(SupportedFormat::Jpeg) => Ok((SupportedFormat::Jpeg, self.jpeg.as_ref())),
            Some(SupportedFormat::Png) => Ok((SupportedFormat::Png, self.png.as_ref())),
            None => Err(OptimizeError::UnsupportedFormat(format_label(format))),
        }
    }
}

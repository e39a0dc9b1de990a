use crate::error::Result;
use crate::registry::Optimizer;
use crate::utils::replace_file_atomically;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageReader};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Re-encodes JPEG files with the codec's own encoder.
///
/// `quality` is taken as-is; [`crate::Config::new`] is where it is checked.
#[derive(Debug, Clone)]
pub struct JpegOptimizer {
    quality: u8,
}

impl JpegOptimizer {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl Optimizer for JpegOptimizer {
    /// Decodes `input`, re-encodes it at the configured quality and replaces
    /// `output` with the result. A decode or encode failure leaves `output`
    /// untouched.
    fn optimize(&self, input: &Path, output: &Path) -> Result<()> {
        let img = ImageReader::open(input)?.with_guessed_format()?.decode()?;
        let img = encodable(img);

        debug!(
            path = %input.display(),
            width = img.width(),
            height = img.height(),
            quality = self.quality,
            "re-encoding JPEG"
        );

        replace_file_atomically(output, |file| {
            let mut writer = BufWriter::new(file);
            let encoder = JpegEncoder::new_with_quality(&mut writer, self.quality);
            img.write_with_encoder(encoder)?;
            writer.flush()?;
            Ok(())
        })
    }
}

/// The JPEG encoder only takes 8-bit luma or RGB.
fn encodable(img: DynamicImage) -> DynamicImage {
    match img.color() {
        ColorType::L8 | ColorType::Rgb8 => img,
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

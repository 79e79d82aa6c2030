use std::io::Write;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbImage};

use crate::error::{Error, Result};

/// Encode `image` as PNG into `writer`. `output` only labels errors.
pub fn encode_rgb_png<W: Write>(writer: W, output: &Path, image: &RgbImage) -> Result<()> {
    PngEncoder::new(writer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| match e {
            ImageError::IoError(source) => Error::Write {
                path: output.to_path_buf(),
                source,
            },
            other => Error::encode(output, other),
        })
}

pub fn write_rgb_png(output: &Path, image: &RgbImage) -> Result<()> {
    super::write_via_temp(output, |writer| encode_rgb_png(writer, output, image))
}

use std::path::Path;

use image::RgbImage;

use crate::error::{Error, Result};

/// Decode any supported file into a 3-channel RGB buffer.
pub fn load_rgb_image(path: &Path) -> Result<RgbImage> {
    let decoded = image::open(path).map_err(|e| Error::decode(path, e))?;
    Ok(decoded.to_rgb8())
}

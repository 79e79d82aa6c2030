use jpeg_encoder::{ColorType, Encoder};
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};

/// Encode packed RGB rows as JPEG into `writer`. `output` only labels errors.
pub fn encode_rgb_jpeg<W: Write>(
    writer: W,
    output: &Path,
    cols: u32,
    rows: u32,
    rgb_data: &[u8],
    quality: u8,
) -> Result<()> {
    let (cols, rows) = match (u16::try_from(cols), u16::try_from(rows)) {
        (Ok(c), Ok(r)) => (c, r),
        _ => {
            return Err(Error::encode(
                output,
                format!("{cols}x{rows} exceeds the JPEG size limit of 65535"),
            ));
        }
    };
    Encoder::new(writer, quality)
        .encode(rgb_data, cols, rows, ColorType::Rgb)
        .map_err(|e| Error::encode(output, e))
}

pub fn write_rgb_jpeg(
    output: &Path,
    cols: u32,
    rows: u32,
    rgb_data: &[u8],
    quality: u8,
) -> Result<()> {
    super::write_via_temp(output, |writer| {
        encode_rgb_jpeg(writer, output, cols, rows, rgb_data, quality)
    })
}

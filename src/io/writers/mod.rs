//! Output writers. The destination's extension picks the encoder; anything
//! other than PNG is written as JPEG.
//!
//! Encoders write into a temporary file next to the destination, which is
//! renamed into place only once the encoded bytes are flushed. A failed or
//! interrupted write never leaves a file at the destination path.
pub mod jpeg;
pub mod png;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::RgbImage;

use crate::error::{Error, Result};

fn write_error(output: &Path, source: std::io::Error) -> Error {
    Error::Write {
        path: output.to_path_buf(),
        source,
    }
}

/// Run `encode` against `writer`, then flush it so buffered bytes surface
/// their I/O errors here instead of on drop.
pub(crate) fn encode_and_flush<W, F>(output: &Path, mut writer: W, encode: F) -> Result<()>
where
    W: Write,
    F: FnOnce(&mut W) -> Result<()>,
{
    encode(&mut writer)?;
    writer.flush().map_err(|e| write_error(output, e))
}

pub(crate) fn write_via_temp<F>(output: &Path, encode: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".endocrop-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|e| write_error(output, e))?;
    encode_and_flush(output, BufWriter::new(temp.as_file_mut()), encode)?;
    temp.persist(output).map_err(|e| write_error(output, e.error))?;
    Ok(())
}

pub fn save_rgb_image(output: &Path, image: &RgbImage, jpeg_quality: u8) -> Result<()> {
    let is_png = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        png::write_rgb_png(output, image)
    } else {
        jpeg::write_rgb_jpeg(
            output,
            image.width(),
            image.height(),
            image.as_raw(),
            jpeg_quality,
        )
    }
}

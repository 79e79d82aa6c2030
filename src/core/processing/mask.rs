use std::path::Path;

use image::RgbImage;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::ImageShape;

/// Fixed-shape binary stencil. Pixels where the bitmap is zero are cleared.
///
/// A mask only ever touches images of exactly its own shape; anything else
/// passes through untouched, so a mask tuned for one capture device cannot
/// corrupt frames from another.
#[derive(Debug, Clone)]
pub struct Mask {
    expected_shape: ImageShape,
    bitmap: RgbImage,
}

impl Mask {
    /// Decode a mask bitmap, normalized to RGB, and check it against `expected_shape`.
    pub fn load(path: &Path, expected_shape: Option<ImageShape>) -> Result<Self> {
        let bitmap = image::open(path)
            .map_err(|e| Error::MaskLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .to_rgb8();
        let actual = ImageShape::of_rgb(&bitmap);

        if let Some(expected) = expected_shape {
            if expected != actual {
                return Err(Error::MaskShapeMismatch {
                    path: path.to_path_buf(),
                    expected,
                    actual,
                });
            }
        }

        debug!("Loaded mask {:?} with shape {}", path, actual);
        Ok(Self::from_bitmap(bitmap))
    }

    pub fn from_bitmap(bitmap: RgbImage) -> Self {
        Self {
            expected_shape: ImageShape::of_rgb(&bitmap),
            bitmap,
        }
    }

    pub fn expected_shape(&self) -> ImageShape {
        self.expected_shape
    }

    pub fn matches(&self, image: &RgbImage) -> bool {
        ImageShape::of_rgb(image) == self.expected_shape
    }

    /// Bitwise AND of `image` with the bitmap; identity for other shapes.
    pub fn apply(&self, mut image: RgbImage) -> RgbImage {
        if !self.matches(&image) {
            return image;
        }
        for (px, m) in image.iter_mut().zip(self.bitmap.iter()) {
            *px &= *m;
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// 4x4 stencil with the left half opaque.
    fn left_half_mask() -> Mask {
        Mask::from_bitmap(RgbImage::from_fn(4, 4, |x, _| {
            if x < 2 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        }))
    }

    fn noisy(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 37 + y) as u8, (y * 53 + 7) as u8, (x ^ y) as u8 | 1])
        })
    }

    #[test]
    fn non_matching_shape_is_identity() {
        let mask = left_half_mask();
        let image = noisy(5, 4);
        assert_eq!(mask.apply(image.clone()), image);
    }

    #[test]
    fn matching_shape_clears_outside_and_keeps_inside() {
        let mask = left_half_mask();
        let image = noisy(4, 4);
        let out = mask.apply(image.clone());
        for (x, y, px) in out.enumerate_pixels() {
            if x < 2 {
                assert_eq!(px, image.get_pixel(x, y));
            } else {
                assert_eq!(*px, Rgb([0, 0, 0]));
            }
        }
    }

    #[test]
    fn per_channel_stencil_is_anded() {
        let mask = Mask::from_bitmap(RgbImage::from_pixel(2, 2, Rgb([255, 0, 255])));
        let out = mask.apply(RgbImage::from_pixel(2, 2, Rgb([10, 20, 30])));
        assert!(out.pixels().all(|p| *p == Rgb([10, 0, 30])));
    }

    #[test]
    fn load_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.png");
        RgbImage::from_pixel(8, 6, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();

        let mask = Mask::load(&path, Some(ImageShape::new(6, 8, 3))).unwrap();
        assert_eq!(mask.expected_shape(), ImageShape::new(6, 8, 3));

        let err = Mask::load(&path, Some(ImageShape::new(8, 6, 3))).unwrap_err();
        assert!(matches!(err, Error::MaskShapeMismatch { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Mask::load(Path::new("/nonexistent/mask.png"), None).unwrap_err();
        assert!(matches!(err, Error::MaskLoad { .. }));
    }
}

//! Content-based autocrop: locate the largest bright region on a dark
//! surround and crop the original image to its bounding box.
//!
//! The threshold assumes the subject sits on a near-black background, as in
//! endoscopic frames with a dark vignette. Images without such a surround
//! crop to (almost) the full frame.
use image::{GrayImage, RgbImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::contrast::threshold;
use imageproc::filter::gaussian_blur_f32;
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::CropRect;

/// Kernel size of the denoising blur.
pub const BLUR_KERNEL_SIZE: u32 = 5;
/// Pixels strictly brighter than this are foreground.
pub const FOREGROUND_THRESHOLD: u8 = 10;

/// Sigma a Gaussian of the given odd kernel size gets when none is specified.
fn sigma_for_kernel(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Binary foreground mask: grayscale, blur, threshold.
pub fn foreground(image: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    let blurred = gaussian_blur_f32(&gray, sigma_for_kernel(BLUR_KERNEL_SIZE));
    threshold(&blurred, FOREGROUND_THRESHOLD)
}

/// Twice the enclosed area of a closed polyline (shoelace formula).
fn doubled_area(contour: &Contour<i32>) -> i64 {
    let points = &contour.points;
    if points.len() < 3 {
        return 0;
    }
    let mut sum = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        sum += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    sum.abs()
}

fn bounding_rect(contour: &Contour<i32>) -> CropRect {
    let (mut min_x, mut min_y) = (i32::MAX, i32::MAX);
    let (mut max_x, mut max_y) = (i32::MIN, i32::MIN);
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    CropRect {
        x: min_x as u32,
        y: min_y as u32,
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    }
}

/// Pick the largest external contour of `binary`.
///
/// Ties keep the contour discovered first; discovery follows a raster scan,
/// top to bottom and left to right.
fn largest_external_contour(binary: &GrayImage) -> Option<Contour<i32>> {
    let mut best: Option<(i64, Contour<i32>)> = None;
    for contour in find_contours::<i32>(binary) {
        if contour.border_type != BorderType::Outer || contour.parent.is_some() {
            continue;
        }
        if contour.points.is_empty() {
            continue;
        }
        let area = doubled_area(&contour);
        if best.as_ref().is_none_or(|(best_area, _)| area > *best_area) {
            best = Some((area, contour));
        }
    }
    best.map(|(_, contour)| contour)
}

/// Bounding rectangle of the largest foreground region.
pub fn find_crop_rect(image: &RgbImage) -> Result<CropRect> {
    let binary = foreground(image);
    let contour = largest_external_contour(&binary).ok_or(Error::AutocropNoSubject)?;
    let rect = bounding_rect(&contour);
    trace!(
        "Autocrop rect x={} y={} w={} h={} ({} contour points)",
        rect.x,
        rect.y,
        rect.width,
        rect.height,
        contour.points.len()
    );
    Ok(rect)
}

/// Crop the original (unfiltered) image to its largest foreground region.
pub fn autocrop(image: &RgbImage) -> Result<RgbImage> {
    let rect = find_crop_rect(image)?;
    Ok(image::imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn black(width: u32, height: u32) -> RgbImage {
        RgbImage::new(width, height)
    }

    fn fill(image: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                image.put_pixel(x, y, color);
            }
        }
    }

    fn assert_within(rect: CropRect, image: &RgbImage) {
        assert!(rect.width > 0 && rect.height > 0);
        assert!(rect.right() <= image.width());
        assert!(rect.bottom() <= image.height());
    }

    #[test]
    fn default_sigma_for_5x5_kernel() {
        assert!((sigma_for_kernel(5) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn crops_around_bright_subject() {
        let mut image = black(80, 60);
        fill(&mut image, 20, 15, 30, 20, Rgb([200, 120, 90]));

        let rect = find_crop_rect(&image).unwrap();
        assert_within(rect, &image);
        // the blur may grow the region slightly, never shrink it
        assert!(rect.x <= 20 && rect.y <= 15);
        assert!(rect.right() >= 50 && rect.bottom() >= 35);
        assert!(rect.x >= 15 && rect.y >= 10);
        assert!(rect.right() <= 55 && rect.bottom() <= 40);

        let cropped = autocrop(&image).unwrap();
        assert_eq!(cropped.dimensions(), (rect.width, rect.height));
        let cx = 35 - rect.x;
        let cy = 25 - rect.y;
        assert_eq!(*cropped.get_pixel(cx, cy), Rgb([200, 120, 90]));
    }

    #[test]
    fn picks_largest_region() {
        let mut image = black(100, 50);
        fill(&mut image, 5, 5, 8, 8, Rgb([255, 255, 255]));
        fill(&mut image, 50, 10, 30, 30, Rgb([255, 255, 255]));

        let rect = find_crop_rect(&image).unwrap();
        assert!(rect.x >= 45, "expected the larger square, got {:?}", rect);
        assert!(rect.width >= 30 && rect.height >= 30);
    }

    #[test]
    fn equal_areas_keep_first_in_scan_order() {
        let mut image = black(100, 40);
        fill(&mut image, 10, 10, 12, 12, Rgb([255, 255, 255]));
        fill(&mut image, 70, 10, 12, 12, Rgb([255, 255, 255]));

        let rect = find_crop_rect(&image).unwrap();
        assert!(rect.right() < 50, "expected the left square, got {:?}", rect);
    }

    #[test]
    fn holes_do_not_compete_with_their_outer_border() {
        let mut image = black(60, 60);
        fill(&mut image, 10, 10, 40, 40, Rgb([255, 255, 255]));
        fill(&mut image, 20, 20, 20, 20, Rgb([0, 0, 0]));
        // small island inside the hole is not an external contour
        fill(&mut image, 28, 28, 4, 4, Rgb([255, 255, 255]));

        let rect = find_crop_rect(&image).unwrap();
        assert!(rect.x <= 10 && rect.right() >= 50);
    }

    #[test]
    fn all_dark_image_has_no_subject() {
        let mut image = black(32, 32);
        fill(&mut image, 0, 0, 32, 32, Rgb([5, 5, 5]));
        assert!(matches!(autocrop(&image), Err(Error::AutocropNoSubject)));
    }

    #[test]
    fn subject_touching_border_stays_in_bounds() {
        let mut image = black(40, 30);
        fill(&mut image, 0, 0, 15, 30, Rgb([180, 180, 180]));
        let rect = find_crop_rect(&image).unwrap();
        assert_within(rect, &image);
        assert_eq!((rect.x, rect.y), (0, 0));
        assert_eq!(rect.height, 30);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let mut image = black(64, 48);
        fill(&mut image, 12, 9, 33, 21, Rgb([90, 200, 30]));
        fill(&mut image, 50, 30, 6, 6, Rgb([250, 250, 250]));

        let first = autocrop(&image).unwrap();
        for _ in 0..3 {
            assert_eq!(find_crop_rect(&image).unwrap(), find_crop_rect(&image).unwrap());
            assert_eq!(autocrop(&image).unwrap().as_raw(), first.as_raw());
        }
    }
}

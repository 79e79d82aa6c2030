//! High-level, ergonomic library API: transform a single image file, or a
//! whole directory tree with progress and cancellation. Prefer these
//! entrypoints over the low-level `core` modules when integrating endocrop.
use std::path::Path;

use tracing::{info, warn};

use crate::core::batch::{
    BatchReport, CancelToken, PathMapper, Progress, WorkerPool, enumerate_tasks,
};
use crate::core::params::{MaskAsset, ProcessingParams};
use crate::core::processing::{Mask, Pipeline};
use crate::error::Result;
use crate::io::{load_rgb_image, save_rgb_image};

fn load_mask(asset: Option<&MaskAsset>, enabled: bool) -> Result<Option<Mask>> {
    match asset {
        Some(asset) if enabled => Mask::load(&asset.path, asset.shape).map(Some),
        _ => Ok(None),
    }
}

/// Load the configured masks and build the transform pipeline.
///
/// Mask assets are only read when their stage is enabled; a missing or
/// misshapen asset is a setup error.
pub fn build_pipeline(params: &ProcessingParams) -> Result<Pipeline> {
    // the primary mask is on by default, so running without one is routine
    if params.apply_mask_primary && params.mask_primary.is_none() {
        info!("No primary mask asset configured; primary mask stage skipped");
    }
    if params.apply_mask_secondary && params.mask_secondary.is_none() {
        warn!("Secondary mask enabled but no mask asset configured; skipping it");
    }
    let primary = load_mask(params.mask_primary.as_ref(), params.apply_mask_primary)?;
    let secondary = load_mask(params.mask_secondary.as_ref(), params.apply_mask_secondary)?;
    Ok(Pipeline::new(primary, secondary, params.transform_options()))
}

/// Decode `input`, run the pipeline, and write the result to `output`.
pub fn process_image_to_path(
    pipeline: &Pipeline,
    input: &Path,
    output: &Path,
    jpeg_quality: u8,
) -> Result<()> {
    let image = load_rgb_image(input)?;
    let transformed = pipeline.transform(image)?;
    save_rgb_image(output, &transformed, jpeg_quality)
}

/// Process every accepted image under `input_dir` into `output_dir`.
pub fn process_directory_to_path(
    input_dir: &Path,
    output_dir: &Path,
    params: &ProcessingParams,
) -> Result<BatchReport> {
    process_directory_with_progress(input_dir, output_dir, params, CancelToken::new(), |_| {})
}

/// Like [`process_directory_to_path`], reporting progress after each task
/// and honoring `cancel` between tasks.
///
/// Setup errors (invalid roots, mask assets, parameters) are returned before
/// any image is touched. Per-image failures never fail the call; they are
/// recorded in the returned report.
pub fn process_directory_with_progress<P>(
    input_dir: &Path,
    output_dir: &Path,
    params: &ProcessingParams,
    cancel: CancelToken,
    on_progress: P,
) -> Result<BatchReport>
where
    P: Fn(Progress) + Sync,
{
    params.validate()?;
    let pipeline = build_pipeline(params)?;
    let pool = WorkerPool::new(params.worker_count)?.with_cancel_token(cancel);
    let mapper = PathMapper::new(params.output_extension);

    info!("Starting batch processing from directory: {:?}", input_dir);
    info!("Output directory: {:?}", output_dir);

    let enumeration = enumerate_tasks(input_dir, output_dir, &mapper, params.overwrite)?;
    info!(
        "Processing {} image(s) with {} worker(s), writing .{}",
        enumeration.tasks.len(),
        pool.worker_count(),
        mapper.output_extension()
    );

    let mut report = pool.run(
        enumeration.tasks,
        |task| {
            process_image_to_path(
                &pipeline,
                &task.source,
                &task.destination,
                params.jpeg_quality,
            )
        },
        on_progress,
    );
    report.skipped = enumeration.skipped;

    info!("Batch processing complete!");
    info!("Completed: {}", report.completed());
    info!("Skipped: {}", report.skipped());
    info!("Failed: {}", report.failed());
    if report.cancelled() > 0 {
        info!("Cancelled: {}", report.cancelled());
    }
    Ok(report)
}

#![doc = r#"
endocrop: batch mask-and-autocrop for trees of endoscopic images.

This crate walks a source directory, mirrors its structure at a destination,
and converts every `.jpg`/`.png` it finds: optional fixed-shape masks zero out
everything outside a device's region of interest, then autocrop trims the
dark surround down to the bounding box of the largest bright region. Work is
spread over a fixed number of workers; one bad file never stops the batch.

Autocrop assumption
-------------------
Foreground is anything brighter than intensity 10 after a light blur. This
suits endoscopic frames with a black vignette and nothing else; images on a
bright background crop to the full frame.

Quick start: process a directory
--------------------------------
```rust,no_run
use std::path::Path;
use endocrop::{process_directory_to_path, ProcessingParams};

fn main() -> endocrop::Result<()> {
    let params = ProcessingParams {
        worker_count: 4,
        ..Default::default()
    };

    let report = process_directory_to_path(
        Path::new("/data/raw"),
        Path::new("/data/cropped"),
        &params,
    )?;

    println!(
        "completed={} skipped={} failed={}",
        report.completed(),
        report.skipped(),
        report.failed()
    );
    for (task, reason) in report.failures() {
        eprintln!("{:?}: {}", task.source, reason);
    }
    Ok(())
}
```

Single image with explicit masks
--------------------------------
```rust,no_run
use std::path::Path;
use endocrop::{process_image_to_path, ImageShape, Mask, Pipeline, TransformOptions};

fn main() -> endocrop::Result<()> {
    let mask = Mask::load(
        Path::new("masks/olympus.png"),
        Some(ImageShape::new(1080, 1350, 3)),
    )?;
    let pipeline = Pipeline::new(Some(mask), None, TransformOptions::default());
    process_image_to_path(&pipeline, Path::new("in.png"), Path::new("out.jpg"), 95)
}
```

Error handling
--------------
All public functions return `endocrop::Result<T>`. Setup problems (a source
that is not a directory, a destination that is a file, an unreadable or
misshapen mask) come back as `Err` before any image is touched. Per-image
problems are recorded in the [`BatchReport`] instead.

Useful modules
--------------
- [`api`]: high-level entry points.
- [`core`]: masks, autocrop, pipeline, and the batch engine.
- [`io`]: image decoding and JPEG/PNG writers.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use crate::core::params::{MaskAsset, ProcessingParams, TransformOptions};
pub use error::{Error, Result};
pub use types::{CropRect, FailurePolicy, ImageShape, OutputExtension};

// Processing stages
pub use crate::core::processing::{Mask, Pipeline, autocrop, find_crop_rect};

// Batch engine
pub use crate::core::batch::{
    BatchReport, CancelToken, Enumeration, PathMapper, Progress, SkipCounts, Task, TaskOutcome,
    WorkerPool, enumerate_tasks,
};

// High-level API re-exports
pub use api::{
    build_pipeline, process_directory_to_path, process_directory_with_progress,
    process_image_to_path,
};

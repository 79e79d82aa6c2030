use image::RgbImage;
use tracing::{info, warn};

use crate::core::params::TransformOptions;
use crate::core::processing::autocrop::autocrop;
use crate::core::processing::mask::Mask;
use crate::error::Result;

/// Per-image transform: primary mask, secondary mask, then autocrop.
///
/// Masking runs first on purpose: it removes background before autocrop
/// locates the region of interest. The pipeline holds only read-only state
/// and is shared by reference across workers.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    mask_primary: Option<Mask>,
    mask_secondary: Option<Mask>,
    options: TransformOptions,
}

impl Pipeline {
    pub fn new(
        mask_primary: Option<Mask>,
        mask_secondary: Option<Mask>,
        options: TransformOptions,
    ) -> Self {
        if options.apply_mask_primary && mask_primary.is_none() {
            warn!("Primary mask enabled but no mask asset configured; skipping it");
        }
        if options.apply_mask_secondary && mask_secondary.is_none() {
            warn!("Secondary mask enabled but no mask asset configured; skipping it");
        }
        info!(
            "Pipeline: mask_primary={} mask_secondary={} autocrop={}",
            options.apply_mask_primary && mask_primary.is_some(),
            options.apply_mask_secondary && mask_secondary.is_some(),
            options.apply_autocrop
        );
        Self {
            mask_primary,
            mask_secondary,
            options,
        }
    }

    pub fn transform(&self, image: RgbImage) -> Result<RgbImage> {
        let mut image = image;
        if self.options.apply_mask_primary {
            if let Some(mask) = &self.mask_primary {
                image = mask.apply(image);
            }
        }
        if self.options.apply_mask_secondary {
            if let Some(mask) = &self.mask_secondary {
                image = mask.apply(image);
            }
        }
        if self.options.apply_autocrop {
            image = autocrop(&image)?;
        }
        Ok(image)
    }
}

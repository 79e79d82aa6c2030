use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{FailurePolicy, ImageShape, OutputExtension};

pub const DEFAULT_WORKER_COUNT: usize = 6;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// A mask bitmap on disk and the shape it must decode to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskAsset {
    pub path: PathBuf,
    /// If set, loading fails unless the bitmap has exactly this shape
    #[serde(default)]
    pub shape: Option<ImageShape>,
}

/// Which pipeline stages run on each image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    pub apply_mask_primary: bool,
    pub apply_mask_secondary: bool,
    pub apply_autocrop: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            apply_mask_primary: true,
            apply_mask_secondary: false,
            apply_autocrop: true,
        }
    }
}

/// Processing parameters suitable for config files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingParams {
    /// Reprocess files whose destination already exists
    pub overwrite: bool,
    pub apply_autocrop: bool,
    pub apply_mask_primary: bool,
    pub apply_mask_secondary: bool,
    /// Fixed number of parallel workers
    pub worker_count: usize,
    pub output_extension: OutputExtension,
    /// 1..=100, used when writing JPEG
    pub jpeg_quality: u8,
    pub mask_primary: Option<MaskAsset>,
    pub mask_secondary: Option<MaskAsset>,
    pub on_failure: FailurePolicy,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        let transform = TransformOptions::default();
        Self {
            overwrite: false,
            apply_autocrop: transform.apply_autocrop,
            apply_mask_primary: transform.apply_mask_primary,
            apply_mask_secondary: transform.apply_mask_secondary,
            worker_count: DEFAULT_WORKER_COUNT,
            output_extension: OutputExtension::Jpg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            mask_primary: None,
            mask_secondary: None,
            on_failure: FailurePolicy::Ignore,
        }
    }
}

impl ProcessingParams {
    /// Load parameters from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let params: Self = serde_json::from_str(&text).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(params)
    }

    /// Stages that will actually run: a mask stage needs both its flag and
    /// a configured asset.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            apply_mask_primary: self.apply_mask_primary && self.mask_primary.is_some(),
            apply_mask_secondary: self.apply_mask_secondary && self.mask_secondary.is_some(),
            apply_autocrop: self.apply_autocrop,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::InvalidArgument {
                arg: "worker_count",
                value: self.worker_count.to_string(),
            });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::InvalidArgument {
                arg: "jpeg_quality",
                value: self.jpeg_quality.to_string(),
            });
        }
        Ok(())
    }
}

use clap::Parser;
use std::path::PathBuf;

use endocrop::{FailurePolicy, ImageShape, OutputExtension};

#[derive(Parser, Debug)]
#[command(
    name = "endocrop",
    version,
    about = "Mask and autocrop every image in a directory tree"
)]
pub struct CliArgs {
    /// Source directory (walked recursively; .jpg and .png are processed)
    #[arg(value_name = "SOURCE_DIR")]
    pub source: PathBuf,

    /// Destination directory (created if missing, mirrors the source tree)
    #[arg(value_name = "DESTINATION_DIR")]
    pub destination: PathBuf,

    /// JSON parameter file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Reprocess images whose output already exists
    #[arg(long, default_value_t = false, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    /// Skip images whose output already exists
    #[arg(long, default_value_t = false, overrides_with = "overwrite")]
    pub no_overwrite: bool,

    /// Enable autocrop
    #[arg(long, default_value_t = false, overrides_with = "no_autocrop")]
    pub autocrop: bool,

    /// Disable autocrop
    #[arg(long, default_value_t = false, overrides_with = "autocrop")]
    pub no_autocrop: bool,

    /// Enable the primary mask
    #[arg(long, default_value_t = false, overrides_with = "no_mask_primary")]
    pub mask_primary: bool,

    /// Disable the primary mask
    #[arg(long, default_value_t = false, overrides_with = "mask_primary")]
    pub no_mask_primary: bool,

    /// Enable the secondary mask
    #[arg(long, default_value_t = false, overrides_with = "no_mask_secondary")]
    pub mask_secondary: bool,

    /// Disable the secondary mask
    #[arg(long, default_value_t = false, overrides_with = "mask_secondary")]
    pub no_mask_secondary: bool,

    /// Primary mask bitmap
    #[arg(long)]
    pub mask_primary_path: Option<PathBuf>,

    /// Shape the primary mask must have, as HxWxC (e.g. 1080x1350x3)
    #[arg(long)]
    pub mask_primary_shape: Option<ImageShape>,

    /// Secondary mask bitmap
    #[arg(long)]
    pub mask_secondary_path: Option<PathBuf>,

    /// Shape the secondary mask must have, as HxWxC
    #[arg(long)]
    pub mask_secondary_shape: Option<ImageShape>,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Output extension (jpg or png)
    #[arg(long, value_enum)]
    pub ext: Option<OutputExtension>,

    /// JPEG quality (1-100)
    #[arg(long)]
    pub jpeg_quality: Option<u8>,

    /// Exit status when some images fail (ignore or fail)
    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,

    /// Write the batch report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Enable logging
    #[arg(long, default_value_t = false)]
    pub log: bool,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}
